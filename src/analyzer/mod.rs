//! 三通道分析器模块
//! 每个分析器输入原始证据 + 签名目录/IP段表，输出每签名至多一条检测记录
pub mod common;
pub mod content;
pub mod header;
pub mod ip;

pub use content::ContentAnalyzer;
pub use header::HeaderAnalyzer;
pub use ip::IpAnalyzer;
