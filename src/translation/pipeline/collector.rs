//! 文本收集器模块
//!
//! 在页面首次渲染后遍历 `<body>`，挑出可翻译的文本节点，
//! 为每个节点生成一条不可变的 [`TextRecord`]，供之后的翻译和还原使用。

use std::collections::HashMap;
use std::rc::Rc;

use markup5ever_rcdom::{Handle, Node, NodeData};

use crate::parsers::html::dom::{find_nodes, get_node_attr, get_node_name, has_class};
use crate::parsers::html::dom::{get_parent_node, get_text, is_attached, set_text};
use crate::translation::config::{constants, TranslationConfig};
use crate::translation::pipeline::filters::{RejectReason, TextFilter};

/// 文本节点的原始记录，创建后不再改变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    /// 按文档顺序分配的序号
    pub id: usize,
    /// 节点未经修剪的原始内容
    pub original_text: String,
    /// 父元素标签名
    pub parent_tag: Option<String>,
}

impl TextRecord {
    /// 用于请求和缓存的文本
    pub fn source_text(&self) -> &str {
        self.original_text.trim()
    }

    /// 把译文放回原文的首尾空白之间
    pub fn wrap_translation(&self, translated: &str) -> String {
        let text = &self.original_text;
        let start = text.len() - text.trim_start().len();
        let end = text.trim_end().len();
        format!("{}{}{}", &text[..start], translated, &text[end..])
    }
}

/// 已登记的文本节点
#[derive(Debug, Clone)]
pub struct TextItem {
    pub node: Handle,
    pub record: TextRecord,
}

impl TextItem {
    /// 节点当前的内容
    pub fn current_text(&self) -> String {
        get_text(&self.node).unwrap_or_default()
    }

    /// 节点是否仍在文档中
    pub fn is_attached(&self) -> bool {
        is_attached(&self.node)
    }

    /// 写入新内容
    pub fn apply(&self, text: &str) -> bool {
        set_text(&self.node, text)
    }

    /// 恢复原文，返回内容是否发生了变化
    pub fn restore(&self) -> bool {
        if self.current_text() == self.record.original_text {
            return false;
        }
        self.apply(&self.record.original_text)
    }
}

/// 节点到记录的映射，生命周期与页面相同
#[derive(Debug, Default)]
pub struct TextRegistry {
    items: Vec<TextItem>,
    index: HashMap<*const Node, usize>,
}

impl TextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记节点，已登记时返回 None
    fn register(&mut self, node: &Handle, parent_tag: Option<String>) -> Option<&TextItem> {
        let key = Rc::as_ptr(node);
        if self.index.contains_key(&key) {
            return None;
        }

        let id = self.items.len();
        let record = TextRecord {
            id,
            original_text: get_text(node).unwrap_or_default(),
            parent_tag,
        };

        self.index.insert(key, id);
        self.items.push(TextItem {
            node: node.clone(),
            record,
        });
        self.items.last()
    }

    /// 查找节点的记录
    pub fn get(&self, node: &Handle) -> Option<&TextRecord> {
        self.index
            .get(&Rc::as_ptr(node))
            .map(|&id| &self.items[id].record)
    }

    pub fn contains(&self, node: &Handle) -> bool {
        self.index.contains_key(&Rc::as_ptr(node))
    }

    pub fn items(&self) -> &[TextItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 把所有仍在文档中的节点恢复为原文，返回实际改写的节点数
    pub fn restore_all(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.is_attached())
            .filter(|item| item.restore())
            .count()
    }
}

/// 文本收集器配置
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 跳过的元素标签
    pub skip_elements: Vec<String>,
    /// 最小文本长度
    pub min_text_length: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            skip_elements: constants::SKIP_ELEMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_text_length: constants::MIN_TEXT_LENGTH,
        }
    }
}

impl From<&TranslationConfig> for CollectorConfig {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
            ..Default::default()
        }
    }
}

/// DOM文本收集器
pub struct TextCollector {
    config: CollectorConfig,
    filter: TextFilter,
    stats: CollectionStats,
}

impl Default for TextCollector {
    fn default() -> Self {
        Self::new(CollectorConfig::default())
    }
}

impl TextCollector {
    /// 创建新的文本收集器
    pub fn new(config: CollectorConfig) -> Self {
        let filter = TextFilter::with_min_length(config.min_text_length);
        Self {
            config,
            filter,
            stats: CollectionStats::default(),
        }
    }

    /// 收集文档中的可翻译文本节点，返回新登记的节点数
    ///
    /// 已登记的节点保持原有序号和原文
    pub fn collect(&mut self, document: &Handle, registry: &mut TextRegistry) -> usize {
        self.stats.reset();

        let root = find_nodes(document, &["html", "body"])
            .into_iter()
            .next()
            .unwrap_or_else(|| document.clone());

        if self.is_opted_out_by_ancestors(&root) {
            tracing::debug!("页面根节点已声明不翻译");
            return 0;
        }

        let before = registry.len();
        self.collect_recursive(&root, registry);
        let added = registry.len() - before;

        tracing::debug!(
            "文本收集完成: 访问 {} 个节点, 新登记 {} 个, 过滤 {} 个",
            self.stats.nodes_visited,
            added,
            self.stats.filtered_texts()
        );

        added
    }

    fn collect_recursive(&mut self, node: &Handle, registry: &mut TextRegistry) {
        self.stats.nodes_visited += 1;

        match node.data {
            NodeData::Text { .. } => self.collect_text_node(node, registry),
            NodeData::Element { .. } => {
                if self.should_skip_element(node) {
                    self.stats.nodes_skipped += 1;
                    return;
                }

                for child in node.children.borrow().iter() {
                    self.collect_recursive(child, registry);
                }
            }
            NodeData::Document => {
                for child in node.children.borrow().iter() {
                    self.collect_recursive(child, registry);
                }
            }
            _ => {}
        }
    }

    fn collect_text_node(&mut self, node: &Handle, registry: &mut TextRegistry) {
        self.stats.text_nodes_found += 1;

        if registry.contains(node) {
            self.stats.already_registered += 1;
            return;
        }

        let text = get_text(node).unwrap_or_default();
        if let Some(reason) = self.filter.reject_reason(&text) {
            self.stats.record_rejection(reason);
            return;
        }

        let parent_tag = get_parent_node(node)
            .and_then(|parent| get_node_name(&parent).map(|name| name.to_string()));

        if let Some(item) = registry.register(node, parent_tag) {
            tracing::trace!("登记文本节点 #{}: {:?}", item.record.id, item.record.source_text());
            self.stats.translatable_texts += 1;
        }
    }

    /// 元素本身需要跳过，或声明了不翻译
    fn should_skip_element(&self, node: &Handle) -> bool {
        let Some(tag_name) = get_node_name(node) else {
            return false;
        };

        let tag_name = tag_name.to_lowercase();
        self.config.skip_elements.iter().any(|skip| *skip == tag_name) || opts_out(node)
    }

    fn is_opted_out_by_ancestors(&self, node: &Handle) -> bool {
        let mut current = get_parent_node(node);
        while let Some(parent) = current {
            if matches!(parent.data, NodeData::Element { .. }) && self.should_skip_element(&parent)
            {
                return true;
            }
            current = get_parent_node(&parent);
        }
        false
    }

    /// 获取收集统计信息
    pub fn get_stats(&self) -> &CollectionStats {
        &self.stats
    }
}

/// `translate="no"` 或 `notranslate` 类
fn opts_out(node: &Handle) -> bool {
    get_node_attr(node, "translate")
        .map(|value| value.trim().eq_ignore_ascii_case("no"))
        .unwrap_or(false)
        || has_class(node, constants::NO_TRANSLATE_CLASS)
}

/// 收集统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub nodes_visited: usize,
    pub nodes_skipped: usize,
    pub text_nodes_found: usize,
    pub translatable_texts: usize,
    pub already_registered: usize,
    pub rejected_too_short: usize,
    pub rejected_numeric: usize,
    pub rejected_url_like: usize,
    pub rejected_no_letters: usize,
}

impl CollectionStats {
    /// 重置统计
    pub fn reset(&mut self) {
        *self = Default::default();
    }

    fn record_rejection(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::TooShort => self.rejected_too_short += 1,
            RejectReason::Numeric => self.rejected_numeric += 1,
            RejectReason::UrlLike => self.rejected_url_like += 1,
            RejectReason::NoLetters => self.rejected_no_letters += 1,
        }
    }

    /// 获取总过滤的文本数
    pub fn filtered_texts(&self) -> usize {
        self.rejected_too_short
            + self.rejected_numeric
            + self.rejected_url_like
            + self.rejected_no_letters
    }

}
