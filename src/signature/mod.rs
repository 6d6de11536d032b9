//! 签名目录模块
//! 原始签名配置（serde模型）→ 模式编译（逐条降级）→ 编译后目录
pub mod catalog;
pub mod compiler;
pub mod model;

pub use catalog::{CompiledSignature, SignatureCatalog};
pub use model::{RawSignature, TechProfile};
