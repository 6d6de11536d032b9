//! webstackspy - Web技术栈指纹识别核心引擎
//!
//! 三条独立证据通道（响应Header / 页面内容 / 托管IP）分别对签名目录做匹配，
//! 再由 [`DetectionStore`] 按分析主体（subject，例如一个浏览器标签页）聚合为
//! 去重、可解释的统一检测结果。引擎本身不抓取、不解析DNS、不渲染页面：
//! 全部原始证据由宿主环境以普通数据形式喂入。

// 签名目录：原始配置解析 + 模式编译
pub mod signature;
// IP段表：供应商CIDR归一化 + 位级CIDR分类
pub mod iprange;
// 三通道分析器（Header / Content / IP）
pub mod analyzer;
// 检测结果模型 + 按主体聚合存储
pub mod detection;
// 通用工具（证据截断、页面过滤）
pub mod utils;

// 导出全局错误类型
pub mod error;
pub use self::error::{SpyResult, WebStackSpyError};

// 导出签名目录核心结构体
pub use crate::signature::{CompiledSignature, RawSignature, SignatureCatalog, TechProfile};

// 导出IP段表与分类器
pub use crate::iprange::{
    load_ip_ranges, CidrClassifier, IpRangeTable, ProviderMatch, ProviderRanges,
    RawProviderPayload,
};

// 导出三通道分析器
pub use crate::analyzer::{ContentAnalyzer, HeaderAnalyzer, IpAnalyzer};

// 导出检测结果核心结构体与聚合存储
pub use crate::detection::{
    Channel, DetectionRecord, DetectionStore, SubjectId, UrlBucket, UrlChannelCounts,
    EVIDENCE_CAP, MERGED_EVIDENCE_CAP, RECENT_CACHE_CAP,
};
