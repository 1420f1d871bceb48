//! # Page Translator Library
//!
//! 在客户端翻译静态网页的可见文本：收集文本节点、查询两级缓存、调用远端翻译服务、
//! 分批写回 DOM，并能随时恢复原文。
//!
//! ## 模块组织
//!
//! - `core` - 文档级入口和顶层错误类型
//! - `env` - 类型化的环境变量
//! - `parsers` - HTML解析、DOM操作和序列化
//! - `translation` - 翻译管道、缓存、偏好存储和页面控件

pub mod core;
pub mod env;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use self::core::*;
pub use parsers::*;
