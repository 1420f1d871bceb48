//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作（解析、查找、属性、文本节点读写）
//! - `metadata`: 文档元数据处理（字符集、语言声明、年份占位）
//! - `serializer`: 序列化功能

pub mod dom;
pub mod metadata;
pub mod serializer;

pub use dom::{
    find_element_by_id, find_elements, find_nodes, get_node_attr,
    get_node_name, get_parent_node, get_text, get_text_content, has_class, html_to_dom,
    is_attached, set_node_attr, set_text, set_text_content,
};
pub use metadata::{
    get_charset, get_document_language, set_document_language, stamp_current_year, stamp_year,
};
pub use serializer::serialize_document;
