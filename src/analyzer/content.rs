//! 内容分析器
//! 两种策略按优先级逐签名尝试：
//! (a) 结构化选择器：单趟流式解析（lol_html）评估全部签名的选择器，
//!     证据取命中元素的标识属性（URL类属性 > id/name > class），兜底标签名；
//! (b) 标记正则：仅当(a)无命中时执行，对整段标记做多处匹配，
//!     以命中点为中心取固定宽度窗口，空白折叠后入证据。
//! 选择器优先：无需整段扫描、精度更高；正则兜底覆盖纯文本式签名。

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use lol_html::html_content::Element;
use lol_html::{ElementContentHandlers, HtmlRewriter, Selector, Settings};
use rustc_hash::FxHashMap;

use crate::analyzer::common::log_match;
use crate::detection::{Channel, DetectionRecord, EVIDENCE_CAP};
use crate::signature::SignatureCatalog;
use crate::utils::{compact_snippet, context_window};

/// 单条证据文本上限（字符）
const SNIPPET_MAX: usize = 120;
/// 正则命中窗口半径（字符）
const WINDOW_RADIUS: usize = 40;

// 元素标识属性优先级：URL类属性优先，短标识次之
const ATTR_PRIORITY: [&str; 8] = [
    "src", "href", "content", "action", "data-src", "id", "name", "class",
];

/// 结构化命中元素：标签名 + 属性快照
#[derive(Debug, Clone)]
struct ElementHit {
    tag: String,
    attrs: Vec<(String, String)>,
}

pub struct ContentAnalyzer;

impl ContentAnalyzer {
    /// 对整段页面标记做签名匹配；每签名至多一条 `content` 通道记录
    pub fn analyze(markup: &str, catalog: &SignatureCatalog) -> Vec<DetectionRecord> {
        if markup.trim().is_empty() || catalog.is_empty() {
            return Vec::new();
        }

        let structural = collect_structural(markup, catalog);

        let mut out = Vec::new();
        for (idx, sig) in catalog.signatures().iter().enumerate() {
            if sig.selectors.is_empty() && sig.html_patterns.is_empty() {
                continue;
            }

            let mut texts: Vec<String> = Vec::new();

            // 策略(a)：结构化命中
            if let Some(hits) = structural.get(&idx) {
                for hit in hits {
                    let evidence = element_evidence(hit);
                    if !evidence.is_empty() && !texts.contains(&evidence) {
                        log_match("Content", &sig.key, &evidence);
                        texts.push(evidence);
                        if texts.len() >= EVIDENCE_CAP {
                            break;
                        }
                    }
                }
            }

            // 策略(b)：标记正则兜底，仅在(a)无命中时执行
            if texts.is_empty() {
                'patterns: for pattern in &sig.html_patterns {
                    for m in pattern.find_iter(markup) {
                        let window = context_window(markup, m.start(), m.end(), WINDOW_RADIUS);
                        let snippet = compact_snippet(window, SNIPPET_MAX);
                        if !snippet.is_empty() && !texts.contains(&snippet) {
                            log_match("Content", &sig.key, &snippet);
                            texts.push(snippet);
                            if texts.len() >= EVIDENCE_CAP {
                                break 'patterns;
                            }
                        }
                    }
                }
            }

            if let Some(record) =
                DetectionRecord::from_profile(&sig.key, &sig.profile, Channel::Content, texts)
            {
                out.push(record);
            }
        }
        out
    }
}

/// 单趟流式解析，收集每条签名的选择器命中元素（每签名上限EVIDENCE_CAP个）
fn collect_structural(markup: &str, catalog: &SignatureCatalog) -> FxHashMap<usize, Vec<ElementHit>> {
    let hits: Rc<RefCell<FxHashMap<usize, Vec<ElementHit>>>> =
        Rc::new(RefCell::new(FxHashMap::default()));

    let mut handlers: Vec<(Cow<Selector>, ElementContentHandlers)> = Vec::new();
    for (idx, sig) in catalog.signatures().iter().enumerate() {
        for raw_selector in &sig.selectors {
            // 目录编译期已校验过语法，这里失败只可能是版本差异，直接跳过
            let Ok(selector) = raw_selector.parse::<Selector>() else {
                continue;
            };
            let sink = Rc::clone(&hits);
            handlers.push((
                Cow::Owned(selector),
                ElementContentHandlers::default().element(move |el: &mut Element| {
                    let mut hits = sink.borrow_mut();
                    let bucket = hits.entry(idx).or_default();
                    if bucket.len() < EVIDENCE_CAP {
                        bucket.push(ElementHit {
                            tag: el.tag_name(),
                            attrs: el
                                .attributes()
                                .iter()
                                .map(|a| (a.name(), a.value()))
                                .collect(),
                        });
                    }
                    Ok(())
                }),
            ));
        }
    }
    if handlers.is_empty() {
        return FxHashMap::default();
    }

    let mut rewriter = HtmlRewriter::new(
        Settings {
            strict: false, // 兼容畸形标记/大小写标签/残缺标签
            element_content_handlers: handlers,
            ..Settings::default()
        },
        |_: &[u8]| {},
    );
    let write_result = rewriter.write(markup.as_bytes());
    let result = write_result.and_then(|_| rewriter.end());
    if let Err(e) = result {
        // 畸形标记导致解析中断：保留已收集命中，降级继续
        debug!("结构化解析中断，保留已收集命中: {}", e);
    }

    Rc::try_unwrap(hits)
        .map(RefCell::into_inner)
        .unwrap_or_else(|rc| rc.borrow().clone())
}

/// 从命中元素导出证据文本：按优先级取首个非空标识属性，兜底标签名
fn element_evidence(hit: &ElementHit) -> String {
    for attr in ATTR_PRIORITY {
        if let Some((_, value)) = hit
            .attrs
            .iter()
            .find(|(name, value)| name == attr && !value.trim().is_empty())
        {
            return compact_snippet(&format!("{} {}={}", hit.tag, attr, value), SNIPPET_MAX);
        }
    }
    hit.tag.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SignatureCatalog {
        SignatureCatalog::load(
            r#"{
                "wordpress": {
                    "name": "WordPress",
                    "html": ["wp-content"],
                    "selectors": ["meta[name=\"generator\"]"]
                },
                "jquery": {
                    "name": "jQuery",
                    "selectors": ["script[src*=\"jquery\"]"]
                },
                "ga": {
                    "name": "Google Analytics",
                    "html": ["googletagmanager\\.com/gtag/js"]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_structural_match_with_attribute_evidence() {
        let markup = r#"<html><head>
            <meta name="generator" content="WordPress 6.4">
            <script src="/assets/jquery-3.7.1.min.js"></script>
        </head><body></body></html>"#;
        let records = ContentAnalyzer::analyze(markup, &catalog());
        assert_eq!(records.len(), 2);
        // 目录按key升序：jquery在前
        assert_eq!(records[0].key, "jquery");
        assert_eq!(records[0].matched_texts, vec!["script src=/assets/jquery-3.7.1.min.js"]);
        // meta元素取content属性（URL类属性优先级中content先于id）
        assert_eq!(records[1].key, "wordpress");
        assert_eq!(records[1].matched_texts, vec!["meta content=WordPress 6.4"]);
        assert_eq!(records[1].channels, vec![Channel::Content]);
    }

    #[test]
    fn test_regex_fallback_window() {
        // 测试场景：无选择器命中时走正则兜底，证据为命中点的窗口片段
        let markup = r#"<script async src="https://www.googletagmanager.com/gtag/js?id=G-1"></script>"#;
        let records = ContentAnalyzer::analyze(markup, &catalog());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "ga");
        assert!(records[0].matched_texts[0].contains("googletagmanager.com/gtag/js"));
    }

    #[test]
    fn test_structural_suppresses_regex_fallback() {
        // 测试场景：结构化已命中时不再执行该签名的正则兜底
        let markup = r#"<meta name="generator" content="WordPress">
            <a href="/wp-content/themes/x/style.css">theme</a>"#;
        let records = ContentAnalyzer::analyze(markup, &catalog());
        let wp = records.iter().find(|r| r.key == "wordpress").unwrap();
        assert_eq!(wp.matched_texts.len(), 1);
        assert!(wp.matched_texts[0].starts_with("meta "));
    }

    #[test]
    fn test_evidence_capped_and_deduped() {
        // 测试场景：重复命中去重、超量截断
        let mut markup = String::new();
        for _ in 0..10 {
            markup.push_str(r#"<script src="/a/jquery.js"></script>"#);
        }
        let records = ContentAnalyzer::analyze(&markup, &catalog());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].matched_texts, vec!["script src=/a/jquery.js"]);
    }

    #[test]
    fn test_tag_name_fallback_evidence() {
        // 测试场景：命中元素无任何标识属性时证据为标签名
        let raw = r#"{"amp": {"name": "AMP", "selectors": ["amp-img"]}}"#;
        let c = SignatureCatalog::load(raw).unwrap();
        let records = ContentAnalyzer::analyze("<body><amp-img></amp-img></body>", &c);
        assert_eq!(records[0].matched_texts, vec!["amp-img"]);
    }

    #[test]
    fn test_empty_markup_degrades() {
        assert!(ContentAnalyzer::analyze("", &catalog()).is_empty());
        assert!(ContentAnalyzer::analyze("   ", &catalog()).is_empty());
    }
}
