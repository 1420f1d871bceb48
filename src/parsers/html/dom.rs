use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let s: String = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => {
            let (string, _, _) = encoding.decode(data);
            string.into_owned()
        }
        None => String::from_utf8_lossy(data).into_owned(),
    };

    parse_document(RcDom::default(), Default::default()).one(s)
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let mut found_nodes = Vec::new();

    let Some((&node_name, rest)) = node_names.split_first() else {
        return found_nodes;
    };

    let is_match = get_node_name(node) == Some(node_name);

    if is_match && rest.is_empty() {
        found_nodes.push(node.clone());
    } else if is_match {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, rest));
        }
        return found_nodes;
    }

    for child_node in node.children.borrow().iter() {
        found_nodes.append(&mut find_nodes(child_node, node_names));
    }

    found_nodes
}

/// 按 id 查找元素（深度优先，返回第一个）
pub fn find_element_by_id(node: &Handle, id: &str) -> Option<Handle> {
    if get_node_attr(node, "id").as_deref() == Some(id) {
        return Some(node.clone());
    }

    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element_by_id(child, id))
}

/// 查找所有满足条件的元素
pub fn find_elements<F>(node: &Handle, predicate: &F) -> Vec<Handle>
where
    F: Fn(&Handle) -> bool,
{
    let mut found = Vec::new();

    if matches!(node.data, NodeData::Element { .. }) && predicate(node) {
        found.push(node.clone());
    }

    for child in node.children.borrow().iter() {
        found.append(&mut find_elements(child, predicate));
    }

    found
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点
///
/// 父引用存放在 `Cell<Option<Weak>>` 中，取出后必须放回
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 判断节点是否仍挂在某个文档节点之下
pub fn is_attached(node: &Handle) -> bool {
    let mut current = node.clone();
    loop {
        if matches!(current.data, NodeData::Document) {
            return true;
        }
        match get_parent_node(&current) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// 判断元素的 class 属性是否包含指定类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    use html5ever::interface::{Attribute, QualName};
    use html5ever::tendril::format_tendril;
    use html5ever::{namespace_url, ns, LocalName};

    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.as_deref() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            // Add new attribute (since originally the target node didn't have it)
            if let Some(attr_value) = attr_value {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// 读取文本节点内容（非文本节点返回 None）
pub fn get_text(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 改写文本节点内容，节点不是文本节点时返回 false
pub fn set_text(node: &Handle, text: &str) -> bool {
    match &node.data {
        NodeData::Text { contents } => {
            let mut contents = contents.borrow_mut();
            contents.clear();
            contents.push_slice(text);
            true
        }
        _ => false,
    }
}

/// 用单个文本节点替换元素的全部子节点
pub fn set_text_content(element: &Handle, text: &str) {
    let text_node = Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    });
    text_node.parent.set(Some(Rc::downgrade(element)));

    let mut children = element.children.borrow_mut();
    for child in children.iter() {
        child.parent.set(None);
    }
    children.clear();
    children.push(text_node);
}

/// 拼接元素下所有文本节点的内容
pub fn get_text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, buf: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        buf.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, buf);
    }
}
