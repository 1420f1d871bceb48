// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use markup5ever_rcdom::RcDom;

use page_translator::parsers::html::{find_nodes, get_text_content, html_to_dom};
use page_translator::translation::core::client::parse_response;
use page_translator::translation::{
    TranslationBackend, TranslationConfig, TranslationError, TranslationResult,
};

/// MyMemory 成功响应体
pub fn success_body(translated: &str) -> String {
    serde_json::json!({
        "responseStatus": 200,
        "responseData": { "translatedText": translated }
    })
    .to_string()
}

/// 带语言选择框和加载提示的完整页面
pub fn page_html(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><title>Test page</title></head><body>
<select id="language-select"><option value="en" selected>English</option><option value="fr">Français</option><option value="de">Deutsch</option></select>
<div id="translation-loading" translate="no" hidden>Translating</div>
{}
<footer>&copy; <span id="current-year">2000</span></footer>
</body></html>"#,
        body
    )
}

pub fn parse(html: &str) -> RcDom {
    html_to_dom(html.as_bytes(), "utf-8")
}

/// 生成 `count` 个段落
pub fn paragraphs_html(count: usize) -> String {
    (0..count)
        .map(|i| format!("<p>Paragraph number {}</p>", i))
        .collect()
}

/// 文档中所有 `<p>` 的文本
pub fn paragraph_texts(dom: &RcDom) -> Vec<String> {
    find_nodes(&dom.document, &["p"])
        .iter()
        .map(get_text_content)
        .collect()
}

/// 没有任何停顿的配置
pub fn fast_config() -> TranslationConfig {
    TranslationConfig {
        initial_delay_ms: 0,
        batch_delay_ms: 0,
        ..Default::default()
    }
}

/// 预设响应体的后端
///
/// 没有预设的文本返回 `[{lang}] {text}`，每次调用都先经过 `parse_response`
pub struct ScriptedBackend {
    bodies: RefCell<HashMap<String, String>>,
    failures: RefCell<HashMap<String, TranslationError>>,
    calls: RefCell<Vec<(String, String)>>,
    delay: Cell<Duration>,
}

impl ScriptedBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            bodies: RefCell::new(HashMap::new()),
            failures: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            delay: Cell::new(Duration::ZERO),
        })
    }

    /// 为指定文本设置原始响应体
    pub fn reply(&self, text: &str, body: &str) -> &Self {
        self.bodies
            .borrow_mut()
            .insert(text.to_string(), body.to_string());
        self
    }

    /// 让指定文本的请求失败
    pub fn fail(&self, text: &str, error: TranslationError) -> &Self {
        self.failures.borrow_mut().insert(text.to_string(), error);
        self
    }

    /// 每次请求前等待
    pub fn set_delay(&self, delay: Duration) -> &Self {
        self.delay.set(delay);
        self
    }

    /// 清除失败设置
    pub fn heal(&self) {
        self.failures.borrow_mut().clear();
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls_for(&self, text: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(called, _)| called == text)
            .count()
    }

    pub fn requested_texts(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(text, _)| text.clone()).collect()
    }
}

#[async_trait(?Send)]
impl TranslationBackend for ScriptedBackend {
    async fn fetch(
        &self,
        text: &str,
        _source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String> {
        self.calls
            .borrow_mut()
            .push((text.to_string(), target_lang.to_string()));

        let delay = self.delay.get();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.borrow().get(text) {
            return Err(error.clone());
        }

        let body = self
            .bodies
            .borrow()
            .get(text)
            .cloned()
            .unwrap_or_else(|| success_body(&format!("[{}] {}", target_lang, text)));

        parse_response(&body)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
