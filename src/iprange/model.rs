//! IP段数据模型
//! 每个供应商一条记录：展示信息 + 归一化后的CIDR列表

use serde::Deserialize;
use serde_json::Value;

use crate::error::SpyResult;
use crate::signature::TechProfile;

/// 供应商原始载荷：展示信息 + 形态各异的上游数据
/// `data` 的具体形态由loader按已知的小集合识别并归一化
#[derive(Debug, Clone, Deserialize)]
pub struct RawProviderPayload {
    pub key: String,
    #[serde(flatten)]
    pub profile: TechProfile,
    #[serde(default)]
    pub data: Value,
}

impl RawProviderPayload {
    /// 从JSON数组解析供应商载荷列表（宿主摄入入口，可报错）
    pub fn from_json(raw: &str) -> SpyResult<Vec<Self>> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// 单个供应商的归一化IP段
/// 不变式：`cidrs` 中每条都是 `address/prefix` 形态（归一化时已过滤）
#[derive(Debug, Clone)]
pub struct ProviderRanges {
    pub key: String,
    pub profile: TechProfile,
    pub cidrs: Vec<String>,
}

/// 全供应商IP段表（保持加载顺序）
#[derive(Debug, Clone, Default)]
pub struct IpRangeTable {
    providers: Vec<ProviderRanges>,
}

impl IpRangeTable {
    pub fn new(providers: Vec<ProviderRanges>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[ProviderRanges] {
        &self.providers
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
