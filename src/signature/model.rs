//! 签名数据模型定义
//! 仅存储规则数据，无业务逻辑，支持序列化/反序列化

use serde::{Deserialize, Serialize};

/// 技术展示信息（签名与IP供应商共用）
/// 检测结果会反范式化携带这些字段，展示层无需二次查询
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub developer: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// 单条原始签名：一项技术在各通道上的检测规则集
/// 配置形态为 `签名key -> RawSignature` 的映射，加载后不可变
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSignature {
    #[serde(flatten)]
    pub profile: TechProfile,
    /// Header正则模式（对 "name: value" 行整体匹配）
    #[serde(default)]
    pub headers: Vec<String>,
    /// 页面标记文本正则模式
    #[serde(default)]
    pub html: Vec<String>,
    /// 结构化选择器（CSS子集）
    #[serde(default)]
    pub selectors: Vec<String>,
}

impl RawSignature {
    /// 是否存在任何可用规则（空签名在编译时直接跳过）
    pub fn has_rules(&self) -> bool {
        !self.headers.is_empty() || !self.html.is_empty() || !self.selectors.is_empty()
    }
}
