//! 翻译管道模块
//!
//! 提供文本处理管道，包括收集、过滤和批次处理

pub mod batch;
pub mod collector;
pub mod filters;

// 重新导出主要类型
pub use batch::{Batch, BatchManager, BatchManagerConfig};
pub use collector::{CollectionStats, CollectorConfig, TextCollector, TextItem, TextRecord, TextRegistry};
pub use filters::{RejectReason, TextFilter};
