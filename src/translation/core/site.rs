//! 站点级翻译入口
//!
//! 负责页面加载和语言切换两个事件：读写语言偏好、更新 `<html lang>` 和语言选择框，
//! 再交给 [`PageTranslator`] 完成实际翻译。

use std::rc::Rc;

use markup5ever_rcdom::Handle;

use super::client::TranslationBackend;
use super::engine::{PageOutcome, PageTranslator, SkipReason};
use super::service::Translator;
use crate::parsers::html::metadata::{set_document_language, stamp_current_year};
use crate::translation::config::{constants, TranslationConfig};
use crate::translation::controls::LanguageSelector;
use crate::translation::error::{helpers::log_error, TranslationResult};
use crate::translation::storage::{KeyValueStore, PreferenceStore, TranslationCache};

/// 站点翻译器
pub struct SiteTranslator {
    page: PageTranslator,
    preferences: PreferenceStore,
    selector: LanguageSelector,
    config: TranslationConfig,
}

impl SiteTranslator {
    /// `store` 同时承载语言偏好和持久化缓存层（缓存禁用时只存偏好）
    pub fn new(
        document: Handle,
        config: TranslationConfig,
        backend: Rc<dyn TranslationBackend>,
        store: Rc<dyn KeyValueStore>,
    ) -> TranslationResult<Self> {
        config.validate()?;

        let cache = if config.cache_enabled {
            TranslationCache::with_store(store.clone())
        } else {
            TranslationCache::memory_only()
        };
        let translator = Translator::new(cache, backend, config.source_lang.clone());
        let selector = LanguageSelector::find(&document);
        let page = PageTranslator::new(document, translator, &config)?;

        Ok(Self {
            page,
            preferences: PreferenceStore::new(store),
            selector,
            config,
        })
    }

    /// 可选的语言：页面上有语言选择框时取它的选项，否则取配置
    pub fn known_languages(&self) -> Vec<String> {
        if self.selector.is_present() {
            self.selector.options()
        } else {
            self.config.languages.clone()
        }
    }

    /// 返回与 `code` 匹配的已知语言代码（保留已知列表中的写法）
    fn resolve_language(&self, code: &str) -> Option<String> {
        let code = code.trim();
        self.known_languages()
            .into_iter()
            .find(|known| known.eq_ignore_ascii_case(code))
    }

    /// 页面首次渲染后调用
    ///
    /// 没有安排翻译时返回 None
    pub async fn on_load(&self) -> Option<PageOutcome> {
        let stamped = stamp_current_year(
            self.page.document(),
            constants::CURRENT_YEAR_ID,
            constants::CURRENT_YEAR_ATTR,
        );
        if stamped > 0 {
            tracing::debug!("更新了 {} 处年份", stamped);
        }

        self.page.extract();

        let saved = self.preferences.load()?;
        let Some(lang) = self.resolve_language(&saved) else {
            tracing::warn!("忽略未知的语言偏好: {}", saved);
            return None;
        };

        self.apply_language_markers(&lang);

        if self.page.is_base_language(&lang) {
            return None;
        }

        tracing::info!("按语言偏好翻译页面: {}", lang);
        tokio::time::sleep(self.config.initial_delay()).await;
        Some(self.page.translate_page(&lang).await)
    }

    /// 语言选择框发生变化时调用
    ///
    /// 未知的语言代码返回 None。翻译进行中时直接返回 `Skipped(Busy)`，
    /// 偏好、`<html lang>` 和选择框都保持当前语言。
    pub async fn on_language_change(&self, code: &str) -> Option<PageOutcome> {
        let Some(lang) = self.resolve_language(code) else {
            tracing::warn!("忽略未知的语言代码: {}", code);
            return None;
        };

        if self.page.is_busy() {
            tracing::debug!("翻译进行中，忽略切换到 {}", lang);
            return Some(PageOutcome::Skipped(SkipReason::Busy));
        }

        if let Err(e) = self.preferences.save(&lang) {
            log_error(&e, "保存语言偏好失败");
        }

        self.apply_language_markers(&lang);
        Some(self.page.translate_page(&lang).await)
    }

    fn apply_language_markers(&self, lang: &str) {
        if !set_document_language(self.page.document(), lang) {
            tracing::debug!("文档没有 <html> 元素，跳过 lang 属性");
        }
        self.selector.select(lang);
    }

    pub fn page(&self) -> &PageTranslator {
        &self.page
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn selector(&self) -> &LanguageSelector {
        &self.selector
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::parsers::html::dom::html_to_dom;
    use crate::parsers::html::metadata::get_document_language;
    use crate::translation::storage::MemoryStore;

    struct EchoBackend;

    #[async_trait(?Send)]
    impl TranslationBackend for EchoBackend {
        async fn fetch(&self, text: &str, _src: &str, tgt: &str) -> TranslationResult<String> {
            Ok(format!("{}:{}", tgt, text))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    const PAGE: &str = r#"<html lang="en"><body>
        <select id="language-select">
            <option value="en" selected>English</option>
            <option value="fr">Français</option>
        </select>
        <p>Hello world</p>
    </body></html>"#;

    fn site(store: Rc<MemoryStore>) -> (markup5ever_rcdom::RcDom, SiteTranslator) {
        let dom = html_to_dom(PAGE.as_bytes(), "utf-8");
        let config = TranslationConfig {
            initial_delay_ms: 0,
            batch_delay_ms: 0,
            ..Default::default()
        };
        let site = SiteTranslator::new(dom.document.clone(), config, Rc::new(EchoBackend), store)
            .unwrap();
        (dom, site)
    }

    #[tokio::test]
    async fn test_unknown_code_is_ignored() {
        let store = Rc::new(MemoryStore::new());
        let (dom, site) = site(store.clone());
        site.on_load().await;

        assert_eq!(site.on_language_change("ja").await, None);
        assert_eq!(store.get(constants::PREFERENCE_KEY).unwrap(), None);
        assert_eq!(get_document_language(&dom.document).as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_language_change_persists_and_marks_page() {
        let store = Rc::new(MemoryStore::new());
        let (dom, site) = site(store.clone());
        assert_eq!(site.on_load().await, None);

        let outcome = site.on_language_change("fr").await;
        assert!(matches!(outcome, Some(PageOutcome::Translated { applied: 1, .. })));
        assert_eq!(site.preferences().load().as_deref(), Some("fr"));
        assert_eq!(get_document_language(&dom.document).as_deref(), Some("fr"));
        assert_eq!(site.selector().selected().as_deref(), Some("fr"));
    }

    #[tokio::test]
    async fn test_saved_preference_is_applied_on_load() {
        let store = Rc::new(MemoryStore::new());
        store.set(constants::PREFERENCE_KEY, "fr").unwrap();

        let (dom, site) = site(store);
        let outcome = site.on_load().await;

        assert!(matches!(outcome, Some(PageOutcome::Translated { .. })));
        assert_eq!(site.page().current_language(), "fr");
        assert_eq!(get_document_language(&dom.document).as_deref(), Some("fr"));
    }

    #[tokio::test]
    async fn test_base_language_preference_schedules_nothing() {
        let store = Rc::new(MemoryStore::new());
        store.set(constants::PREFERENCE_KEY, "en").unwrap();

        let (_dom, site) = site(store);
        assert_eq!(site.on_load().await, None);
        assert_eq!(site.page().current_language(), "en");
    }

    #[test]
    fn test_known_languages_fall_back_to_config() {
        let dom = html_to_dom(b"<p>Hello world</p>", "utf-8");
        let site = SiteTranslator::new(
            dom.document.clone(),
            TranslationConfig::default(),
            Rc::new(EchoBackend),
            Rc::new(MemoryStore::new()),
        )
        .unwrap();

        assert_eq!(site.known_languages().len(), constants::DEFAULT_LANGUAGES.len());
    }
}
