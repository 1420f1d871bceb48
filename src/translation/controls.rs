//! 页面控件
//!
//! 语言选择框和加载提示都是普通的 DOM 元素，页面上可能不存在，
//! 不存在时所有操作都是空操作。

use markup5ever_rcdom::Handle;

use crate::parsers::html::dom::{
    find_element_by_id, find_nodes, get_node_attr, get_text_content, set_node_attr,
};
use crate::translation::config::constants;

/// `<select id="language-select">`
#[derive(Debug, Clone, Default)]
pub struct LanguageSelector {
    element: Option<Handle>,
}

impl LanguageSelector {
    /// 在文档中查找语言选择框
    pub fn find(document: &Handle) -> Self {
        Self {
            element: find_element_by_id(document, constants::LANGUAGE_SELECT_ID),
        }
    }

    pub fn is_present(&self) -> bool {
        self.element.is_some()
    }

    fn option_nodes(&self) -> Vec<Handle> {
        match &self.element {
            Some(select) => find_nodes(select, &["option"]),
            None => Vec::new(),
        }
    }

    /// 选项的值，没有 value 属性时取选项文本
    fn option_value(option: &Handle) -> String {
        get_node_attr(option, "value")
            .unwrap_or_else(|| get_text_content(option))
            .trim()
            .to_string()
    }

    /// 所有可选的语言代码
    pub fn options(&self) -> Vec<String> {
        self.option_nodes()
            .iter()
            .map(Self::option_value)
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// 当前被选中的语言代码
    pub fn selected(&self) -> Option<String> {
        self.option_nodes()
            .iter()
            .find(|option| get_node_attr(option, "selected").is_some())
            .map(Self::option_value)
    }

    /// 选中指定语言，没有该选项时返回 false 且不改动页面
    pub fn select(&self, code: &str) -> bool {
        let options = self.option_nodes();
        let found = options
            .iter()
            .any(|option| Self::option_value(option).eq_ignore_ascii_case(code));

        if !found {
            return false;
        }

        for option in options.iter() {
            let value = if Self::option_value(option).eq_ignore_ascii_case(code) {
                Some(String::new())
            } else {
                None
            };
            set_node_attr(option, "selected", value);
        }

        true
    }
}

/// `#translation-loading`
#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator {
    element: Option<Handle>,
}

impl LoadingIndicator {
    /// 在文档中查找加载提示
    pub fn find(document: &Handle) -> Self {
        Self {
            element: find_element_by_id(document, constants::LOADING_INDICATOR_ID),
        }
    }

    pub fn show(&self) {
        if let Some(element) = &self.element {
            set_node_attr(element, "hidden", None);
            set_node_attr(element, "aria-busy", Some("true".to_string()));
        }
    }

    pub fn hide(&self) {
        if let Some(element) = &self.element {
            set_node_attr(element, "hidden", Some(String::new()));
            set_node_attr(element, "aria-busy", Some("false".to_string()));
        }
    }

    /// 加载提示当前是否可见（页面上没有时为 false）
    pub fn is_visible(&self) -> bool {
        self.element
            .as_ref()
            .map(|element| get_node_attr(element, "hidden").is_none())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;

    const PAGE: &str = r#"<html><body>
        <select id="language-select">
            <option value="en" selected>English</option>
            <option value="fr">Français</option>
            <option>de</option>
        </select>
        <div id="translation-loading" hidden>Translating…</div>
    </body></html>"#;

    #[test]
    fn test_selector_options_and_selection() {
        let dom = html_to_dom(PAGE.as_bytes(), "utf-8");
        let selector = LanguageSelector::find(&dom.document);

        assert!(selector.is_present());
        assert_eq!(selector.options(), vec!["en", "fr", "de"]);
        assert_eq!(selector.selected().as_deref(), Some("en"));

        assert!(selector.select("FR"));
        assert_eq!(selector.selected().as_deref(), Some("fr"));

        assert!(!selector.select("ja"));
        assert_eq!(selector.selected().as_deref(), Some("fr"));
    }

    #[test]
    fn test_missing_controls_are_noops() {
        let dom = html_to_dom(b"<p>No controls</p>", "utf-8");

        let selector = LanguageSelector::find(&dom.document);
        assert!(!selector.is_present());
        assert!(selector.options().is_empty());
        assert!(!selector.select("fr"));

        let indicator = LoadingIndicator::find(&dom.document);
        indicator.show();
        assert!(!indicator.is_visible());
    }

    #[test]
    fn test_loading_indicator_toggles() {
        let dom = html_to_dom(PAGE.as_bytes(), "utf-8");
        let indicator = LoadingIndicator::find(&dom.document);
        assert!(!indicator.is_visible());

        indicator.show();
        assert!(indicator.is_visible());

        indicator.hide();
        assert!(!indicator.is_visible());
    }
}
