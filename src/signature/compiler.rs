//! 模式编译：正则与选择器的逐条编译
//! 失败策略：单条模式编译失败仅丢弃该条（warn日志），从不否决整个签名

use log::warn;
use lol_html::Selector;
use regex::{Regex, RegexBuilder};

/// 编译单条正则模式（统一忽略大小写）
/// 返回None表示该条被丢弃
pub(crate) fn compile_pattern(sig_key: &str, raw: &str) -> Option<Regex> {
    match RegexBuilder::new(raw).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("签名[{}]正则编译失败，丢弃该条模式: {} | {}", sig_key, raw, e);
            None
        }
    }
}

/// 校验单条选择器是否为可用的CSS子集
/// 通过校验的保留原始字符串（匹配时再解析），失败丢弃
pub(crate) fn validate_selector(sig_key: &str, raw: &str) -> Option<String> {
    match raw.parse::<Selector>() {
        Ok(_) => Some(raw.to_string()),
        Err(e) => {
            warn!("签名[{}]选择器解析失败，丢弃该条: {} | {:?}", sig_key, raw, e);
            None
        }
    }
}
