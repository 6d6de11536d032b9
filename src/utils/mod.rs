//! 通用工具模块
pub mod evidence;
pub mod page_filter;

pub use evidence::{compact_snippet, context_window};
pub use page_filter::should_analyze_url;
