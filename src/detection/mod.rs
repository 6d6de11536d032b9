//! 检测结果模块
//! 检测记录模型（通道/证据）+ 按主体聚合的检测存储
pub mod record;
pub mod store;

pub use record::{Channel, DetectionRecord, EVIDENCE_CAP, MERGED_EVIDENCE_CAP};
pub use store::{DetectionStore, SubjectId, UrlBucket, UrlChannelCounts, RECENT_CACHE_CAP};
