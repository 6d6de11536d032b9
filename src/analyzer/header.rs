//! Header分析器
//! 输入宿主采集的 (name, value) 响应头对，归一化为 "name: value" 行（name小写），
//! 对每条签名的Header模式逐行测试；每签名每次调用至多产出一条记录。
//! 无内部状态：相同输入与目录必然产出相同结果。

use rustc_hash::FxHashSet;

use crate::analyzer::common::log_match;
use crate::detection::{Channel, DetectionRecord, EVIDENCE_CAP};
use crate::signature::SignatureCatalog;

pub struct HeaderAnalyzer;

impl HeaderAnalyzer {
    /// 对全部Header行做签名匹配
    /// 证据 = 命中任一模式的Header行（去重，上限EVIDENCE_CAP）
    pub fn analyze(headers: &[(String, String)], catalog: &SignatureCatalog) -> Vec<DetectionRecord> {
        if headers.is_empty() || catalog.is_empty() {
            return Vec::new();
        }

        let lines: Vec<String> = headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name.trim().to_ascii_lowercase(), value.trim()))
            .collect();

        let mut out = Vec::new();
        for sig in catalog.signatures() {
            if sig.header_patterns.is_empty() {
                continue;
            }
            let mut seen = FxHashSet::default();
            let mut matched = Vec::new();
            'lines: for line in &lines {
                for pattern in &sig.header_patterns {
                    if pattern.is_match(line) {
                        if seen.insert(line.clone()) {
                            log_match("Header", &sig.key, line);
                            matched.push(line.clone());
                            if matched.len() >= EVIDENCE_CAP {
                                break 'lines;
                            }
                        }
                        // 每行计一次证据即可，继续看下一行
                        continue 'lines;
                    }
                }
            }
            if let Some(record) =
                DetectionRecord::from_profile(&sig.key, &sig.profile, Channel::Header, matched)
            {
                out.push(record);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SignatureCatalog {
        SignatureCatalog::load(
            r#"{
                "wordpress": {
                    "name": "WordPress",
                    "headers": ["^link:.*wp-json", "x-powered-by:.*wordpress"]
                },
                "nginx": {
                    "name": "Nginx",
                    "headers": ["^server:.*nginx"]
                },
                "selector-only": {
                    "name": "SelectorOnly",
                    "selectors": ["div"]
                }
            }"#,
        )
        .unwrap()
    }

    fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_match_normalized_lines() {
        // 测试场景：name大小写归一化后匹配
        let input = headers(&[
            ("Server", "nginx/1.21.6"),
            ("X-Powered-By", "WordPress"),
        ]);
        let records = HeaderAnalyzer::analyze(&input, &catalog());
        assert_eq!(records.len(), 2);
        // 目录按key升序，nginx在前
        assert_eq!(records[0].key, "nginx");
        assert_eq!(records[0].matched_texts, vec!["server: nginx/1.21.6"]);
        assert_eq!(records[1].channels, vec![Channel::Header]);
    }

    #[test]
    fn test_one_record_per_signature() {
        // 测试场景：多条模式、多行命中仍只产出一条记录，证据去重
        let input = headers(&[
            ("Link", "<https://a.test/wp-json/>; rel=\"https://api.w.org/\""),
            ("X-Powered-By", "WordPress"),
            ("x-powered-by", "WordPress"),
        ]);
        let records = HeaderAnalyzer::analyze(&input, &catalog());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "wordpress");
        assert_eq!(records[0].matched_texts.len(), 2);
    }

    #[test]
    fn test_idempotent() {
        // 测试场景：两次相同调用输出逐字节一致（无隐藏状态）
        let input = headers(&[("Server", "nginx"), ("X-Powered-By", "WordPress")]);
        let c = catalog();
        let a = HeaderAnalyzer::analyze(&input, &c);
        let b = HeaderAnalyzer::analyze(&input, &c);
        assert_eq!(a, b);
    }

    #[test]
    fn test_evidence_cap() {
        // 测试场景：超量命中行被截断到EVIDENCE_CAP
        let input: Vec<(String, String)> = (0..10)
            .map(|i| ("Server".to_string(), format!("nginx/{}", i)))
            .collect();
        let records = HeaderAnalyzer::analyze(&input, &catalog());
        assert_eq!(records[0].matched_texts.len(), EVIDENCE_CAP);
    }

    #[test]
    fn test_empty_input_degrades() {
        assert!(HeaderAnalyzer::analyze(&[], &catalog()).is_empty());
        assert!(HeaderAnalyzer::analyze(
            &headers(&[("Server", "nginx")]),
            &SignatureCatalog::empty()
        )
        .is_empty());
    }
}
