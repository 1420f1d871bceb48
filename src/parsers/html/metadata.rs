//! 文档元数据处理
//!
//! 读取字符集、读写 `<html lang>`，以及页脚年份等页面级元信息

use chrono::Datelike;
use markup5ever_rcdom::Handle;

use super::dom::{find_elements, find_nodes, get_node_attr, set_node_attr, set_text_content};

/// 读取 `<meta charset>` 或 `http-equiv="content-type"` 中声明的字符集
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, &["html", "head", "meta"]).iter() {
        if let Some(charset) = get_node_attr(meta_node, "charset") {
            return Some(charset.trim().to_string());
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content) = get_node_attr(meta_node, "content") {
                let charset = content
                    .split(';')
                    .filter_map(|part| part.trim().split_once('='))
                    .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
                    .map(|(_, value)| value.trim().trim_matches('"').to_string());
                if charset.is_some() {
                    return charset;
                }
            }
        }
    }

    None
}

/// 读取文档声明的语言
pub fn get_document_language(document: &Handle) -> Option<String> {
    find_nodes(document, &["html"])
        .first()
        .and_then(|html| get_node_attr(html, "lang"))
}

/// 设置文档声明的语言，返回是否找到了 `<html>` 元素
pub fn set_document_language(document: &Handle, lang: &str) -> bool {
    match find_nodes(document, &["html"]).first() {
        Some(html) => {
            set_node_attr(html, "lang", Some(lang.to_string()));
            true
        }
        None => false,
    }
}

/// 把当前年份写入所有年份占位元素，返回写入的元素数
pub fn stamp_current_year(document: &Handle, id: &str, attr: &str) -> usize {
    let year = chrono::Local::now().year().to_string();
    stamp_year(document, id, attr, &year)
}

/// 把指定年份写入所有 `id` 匹配或带有 `attr` 属性的元素
pub fn stamp_year(document: &Handle, id: &str, attr: &str, year: &str) -> usize {
    let targets = find_elements(document, &|node: &Handle| {
        get_node_attr(node, "id").as_deref() == Some(id) || get_node_attr(node, attr).is_some()
    });

    for target in targets.iter() {
        set_text_content(target, year);
    }

    targets.len()
}
