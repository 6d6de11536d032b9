//! IP分析器
//! 对 (hostname, ip) 做CIDR分类，把命中供应商包装为 `ip` 通道检测记录
//! （供应商展示信息反范式化进记录，证据为字面 "hostname ip" 文本）

use crate::detection::{Channel, DetectionRecord};
use crate::iprange::{CidrClassifier, IpRangeTable};

pub struct IpAnalyzer;

impl IpAnalyzer {
    pub fn analyze(hostname: &str, ip: &str, table: &IpRangeTable) -> Vec<DetectionRecord> {
        CidrClassifier::classify(hostname, ip, table)
            .into_iter()
            .filter_map(|m| {
                DetectionRecord::from_profile(
                    &m.provider.key,
                    &m.provider.profile,
                    Channel::Ip,
                    vec![m.evidence],
                )
            })
            .collect()
    }
}
