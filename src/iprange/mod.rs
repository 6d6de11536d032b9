//! IP段模块
//! 供应商CIDR表归一化（多种上游形态）+ 位级CIDR分类器
pub mod classifier;
pub mod loader;
pub mod model;

pub use classifier::{cidr_contains, CidrClassifier, ProviderMatch};
pub use loader::load_ip_ranges;
pub use model::{IpRangeTable, ProviderRanges, RawProviderPayload};
