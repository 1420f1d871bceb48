//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM操作、元数据处理、序列化

pub mod html;

pub use html::{html_to_dom, serialize_document};
