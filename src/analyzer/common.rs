//! 分析器通用处理：匹配成功的标准日志输出

use log::debug;

use crate::utils::compact_snippet;

/// 匹配成功统一日志（证据预览截断到80字符）
#[inline(always)]
pub(crate) fn log_match(channel: &str, sig_key: &str, evidence: &str) {
    debug!(
        "[{}]匹配成功 | 签名: {} | 证据: {}",
        channel,
        sig_key,
        compact_snippet(evidence, 80)
    );
}
