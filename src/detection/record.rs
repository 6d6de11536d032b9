//! 检测记录模型
//! 统一的带标签检测记录：只能由分析器构造（证据非空），不手工拼装

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::signature::TechProfile;

/// 单通道证据上限（分析器产出时）
pub const EVIDENCE_CAP: usize = 5;
/// 合并后证据上限（跨URL/跨通道并集）
pub const MERGED_EVIDENCE_CAP: usize = 10;

/// 证据通道：一条独立证据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Header,
    Content,
    Ip,
}

impl Channel {
    pub fn tag(&self) -> &'static str {
        match self {
            Channel::Header => "header",
            Channel::Content => "content",
            Channel::Ip => "ip",
        }
    }

    /// 合并时的固定遍历顺序
    pub const ALL: [Channel; 3] = [Channel::Header, Channel::Content, Channel::Ip];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// 一条签名在一个资源上的命中证据
/// 展示字段从签名/供应商信息反范式化而来，展示层无需回查目录
/// 不变式：`matched_texts` 永不为空（构造时强制）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub key: String,
    pub name: String,
    pub description: String,
    pub link: String,
    pub tags: Vec<String>,
    pub developer: String,
    /// 贡献通道：分析器产出单通道，合并后可多通道（仅展示用途）
    pub channels: Vec<Channel>,
    /// 命中证据文本（Header行 / 标记片段 / "hostname ip"）
    pub matched_texts: Vec<String>,
}

impl DetectionRecord {
    /// 由展示信息 + 单通道证据构造；证据为空返回None（不变式保障）
    pub fn from_profile(
        key: &str,
        profile: &TechProfile,
        channel: Channel,
        mut matched_texts: Vec<String>,
    ) -> Option<Self> {
        if matched_texts.is_empty() {
            return None;
        }
        matched_texts.truncate(EVIDENCE_CAP);
        Some(Self {
            key: key.to_string(),
            name: profile.name.clone(),
            description: profile.description.clone(),
            link: profile.link.clone(),
            tags: profile.tags.clone(),
            developer: profile.developer.clone(),
            channels: vec![channel],
            matched_texts,
        })
    }

    /// 是否被多条通道确认（展示提示用）
    pub fn multi_channel(&self) -> bool {
        self.channels.len() > 1
    }
}

// CLI / Report 输出用
impl fmt::Display for DetectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() { &self.key } else { &self.name };
        write!(f, "{} [", name)?;
        for (i, ch) in self.channels.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", ch)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> TechProfile {
        TechProfile {
            name: "WordPress".into(),
            description: "CMS".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_evidence_rejected() {
        // 测试场景：证据列表非空是硬性不变式
        assert!(DetectionRecord::from_profile("wp", &profile(), Channel::Header, vec![]).is_none());
    }

    #[test]
    fn test_evidence_capped_at_construction() {
        let texts = (0..12).map(|i| format!("line{}", i)).collect();
        let rec =
            DetectionRecord::from_profile("wp", &profile(), Channel::Header, texts).unwrap();
        assert_eq!(rec.matched_texts.len(), EVIDENCE_CAP);
        assert_eq!(rec.channels, vec![Channel::Header]);
    }

    #[test]
    fn test_display() {
        let rec = DetectionRecord::from_profile(
            "wp",
            &profile(),
            Channel::Content,
            vec!["x".into()],
        )
        .unwrap();
        assert_eq!(rec.to_string(), "WordPress [content]");
    }
}
