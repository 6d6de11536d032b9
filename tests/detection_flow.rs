//! 端到端流程：三通道证据 → 分析器 → 检测存储 → 合并视图

use webstackspy::{
    load_ip_ranges, Channel, ContentAnalyzer, DetectionStore, HeaderAnalyzer, IpAnalyzer,
    RawProviderPayload, SignatureCatalog,
};

const SIGNATURES: &str = r#"{
    "wordpress": {
        "name": "WordPress",
        "description": "开源CMS",
        "link": "https://wordpress.org",
        "developer": "Automattic",
        "tags": ["cms"],
        "headers": ["^server:.*apache"],
        "html": ["wp-content"],
        "selectors": ["meta[name=\"generator\"]"]
    },
    "nginx": {
        "name": "Nginx",
        "headers": ["^server:.*nginx"]
    }
}"#;

const PROVIDERS: &str = r#"[
    { "key": "aws", "name": "Amazon Web Services", "data": ["10.0.0.0/8"] }
]"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn full_three_channel_flow() {
    init_logger();
    let catalog = SignatureCatalog::load(SIGNATURES).unwrap();
    let table = load_ip_ranges(&RawProviderPayload::from_json(PROVIDERS).unwrap());
    let mut store = DetectionStore::new();

    let subject = 7;
    let url = "https://a.test/";
    store.on_navigation_start(subject, url);

    // 三通道证据以任意顺序到达
    let headers = vec![("Server".to_string(), "Apache/2.4".to_string())];
    store.record_detections(
        subject,
        url,
        Channel::Ip,
        IpAnalyzer::analyze("a.test", "10.1.2.3", &table),
    );
    store.record_detections(
        subject,
        url,
        Channel::Header,
        HeaderAnalyzer::analyze(&headers, &catalog),
    );
    store.record_detections(
        subject,
        url,
        Channel::Content,
        ContentAnalyzer::analyze(
            r#"<meta name="generator" content="WordPress 6.4">"#,
            &catalog,
        ),
    );

    let merged = store.merged_technologies(subject);
    assert_eq!(merged.len(), 2); // wordpress + aws

    let wp = merged.iter().find(|r| r.key == "wordpress").unwrap();
    assert_eq!(wp.name, "WordPress");
    assert_eq!(wp.developer, "Automattic");
    assert!(wp.channels.contains(&Channel::Header));
    assert!(wp.channels.contains(&Channel::Content));
    assert!(wp.matched_texts.contains(&"server: Apache/2.4".to_string()));
    assert!(wp
        .matched_texts
        .iter()
        .any(|t| t.contains("WordPress 6.4")));

    let aws = merged.iter().find(|r| r.key == "aws").unwrap();
    assert_eq!(aws.matched_texts, vec!["a.test 10.1.2.3"]);

    // 概览：三通道均已分析
    let overview = store.url_overview(subject);
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].header, Some(1));
    assert_eq!(overview[0].content, Some(1));
    assert_eq!(overview[0].ip, Some(1));
}

#[test]
fn navigation_away_and_back_restores_without_rematching() {
    init_logger();
    let catalog = SignatureCatalog::load(SIGNATURES).unwrap();
    let mut store = DetectionStore::new();

    let subject = 1;
    let u1 = "https://u1.test/";
    store.on_navigation_start(subject, u1);
    let headers = vec![("Server".to_string(), "nginx/1.25".to_string())];
    store.record_detections(
        subject,
        u1,
        Channel::Header,
        HeaderAnalyzer::analyze(&headers, &catalog),
    );
    let before = store.merged_technologies(subject);
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].key, "nginx");

    // 离开再回来：无需重新匹配即恢复
    store.on_navigation_start(subject, "https://u2.test/");
    assert!(store.merged_technologies(subject).is_empty());
    store.on_navigation_start(subject, u1);
    assert_eq!(store.merged_technologies(subject), before);

    store.remove_subject(subject);
    assert!(store.merged_technologies(subject).is_empty());
}
