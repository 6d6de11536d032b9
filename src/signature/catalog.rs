//! 签名目录：配置解析 + 一次性编译缓存
//! 目录实例即缓存：构造时完成全部编译，进程内按引用传递复用（无隐式全局单例）

use log::{info, warn};
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::SpyResult;
use crate::signature::compiler::{compile_pattern, validate_selector};
use crate::signature::model::{RawSignature, TechProfile};

/// 编译后的签名：原始签名 + 预编译模式对象
/// 编译失败的模式已在构造时丢弃（带诊断日志），签名本身保留
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    pub key: String,
    pub profile: TechProfile,
    pub header_patterns: Vec<Regex>,
    pub html_patterns: Vec<Regex>,
    /// 已通过语法校验的选择器（匹配期再解析）
    pub selectors: Vec<String>,
}

/// 签名目录
#[derive(Debug, Clone, Default)]
pub struct SignatureCatalog {
    // 按key排序，保证匹配输出顺序稳定
    signatures: Vec<CompiledSignature>,
}

impl SignatureCatalog {
    /// 空目录：主签名集加载失败时的降级形态（所有匹配返回空，永不报错）
    pub fn empty() -> Self {
        Self::default()
    }

    /// 从JSON字符串加载并编译签名目录
    /// 唯一会向宿主暴露的错误是JSON本身解析失败；
    /// 单条签名/单条模式的问题逐条降级，不影响其余签名
    pub fn load(raw_json: &str) -> SpyResult<Self> {
        let raw: FxHashMap<String, RawSignature> = serde_json::from_str(raw_json)?;
        Ok(Self::from_raw(raw))
    }

    /// 从已解析的原始配置编译目录
    pub fn from_raw(raw: FxHashMap<String, RawSignature>) -> Self {
        let total = raw.len();
        let mut signatures: Vec<CompiledSignature> = raw
            .into_iter()
            .filter_map(|(key, sig)| {
                if key.trim().is_empty() {
                    warn!("跳过空key签名");
                    return None;
                }
                if !sig.has_rules() {
                    warn!("签名[{}]无任何规则，跳过", key);
                    return None;
                }
                Some(Self::compile_one(key, sig))
            })
            .collect();
        signatures.sort_by(|a, b| a.key.cmp(&b.key));

        info!("签名目录编译完成: {}/{} 条签名可用", signatures.len(), total);
        Self { signatures }
    }

    fn compile_one(key: String, sig: RawSignature) -> CompiledSignature {
        let header_patterns = sig
            .headers
            .iter()
            .filter_map(|p| compile_pattern(&key, p))
            .collect();
        let html_patterns = sig
            .html
            .iter()
            .filter_map(|p| compile_pattern(&key, p))
            .collect();
        let selectors = sig
            .selectors
            .iter()
            .filter_map(|s| validate_selector(&key, s))
            .collect();
        CompiledSignature {
            key,
            profile: sig.profile,
            header_patterns,
            html_patterns,
            selectors,
        }
    }

    /// 全部编译后签名（key升序）
    pub fn signatures(&self) -> &[CompiledSignature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
