//! 全局错误类型定义
//! 核心原则：匹配路径永不报错（按最小粒度降级为“无检测”），
//! 仅配置摄入入口（JSON解析）向宿主暴露错误。
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebStackSpyError {
    // 签名/规则相关错误
    #[error("签名配置加载失败：{0}")]
    SignatureLoadError(String),

    // IP段配置相关错误
    #[error("IP段配置加载失败：{0}")]
    ProviderLoadError(String),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

// 全局Result类型
pub type SpyResult<T> = Result<T, WebStackSpyError>;
