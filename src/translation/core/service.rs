//! 翻译服务
//!
//! 把两级缓存和远端后端组合成一个永不失败的 `translate`：
//! 任何失败都记录警告并返回原文，失败结果不写缓存。

use std::rc::Rc;

use super::client::{normalize_translation, TranslationBackend};
use crate::translation::error::TranslationResult;
use crate::translation::storage::{CacheStats, TranslationCache};

/// 单段文本翻译器
pub struct Translator {
    cache: TranslationCache,
    backend: Rc<dyn TranslationBackend>,
    source_lang: String,
}

impl Translator {
    pub fn new(
        cache: TranslationCache,
        backend: Rc<dyn TranslationBackend>,
        source_lang: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            backend,
            source_lang: source_lang.into(),
        }
    }

    /// 翻译文本，失败时返回原文
    pub async fn translate(&self, text: &str, target_lang: &str) -> String {
        match self.try_translate(text, target_lang).await {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(
                    "翻译失败，保留原文 ({} → {}, 后端 {}): {}",
                    self.source_lang,
                    target_lang,
                    self.backend.name(),
                    e
                );
                text.to_string()
            }
        }
    }

    /// 翻译文本并返回错误，成功结果写入两级缓存
    ///
    /// 目标语言代码按小写处理，`FR` 和 `fr` 共用同一条缓存
    pub async fn try_translate(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        let source_text = text.trim();
        let target_lang = target_lang.trim().to_ascii_lowercase();
        let target_lang = target_lang.as_str();

        if source_text.is_empty() || target_lang.eq_ignore_ascii_case(&self.source_lang) {
            return Ok(text.to_string());
        }

        if let Some(cached) = self.cache.get(source_text, target_lang) {
            tracing::trace!("缓存命中: {:?}", source_text);
            return Ok(cached);
        }

        let result = self
            .backend
            .fetch(source_text, &self.source_lang, target_lang)
            .await
            .and_then(|raw| normalize_translation(&raw));

        self.cache.record_remote(result.is_ok());

        let translated = result?;
        self.cache.put(source_text, target_lang, &translated);
        Ok(translated)
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use async_trait::async_trait;

    use super::*;
    use crate::translation::error::TranslationError;

    /// 按调用顺序返回预设结果
    struct QueueBackend {
        replies: RefCell<Vec<TranslationResult<String>>>,
        calls: Cell<usize>,
    }

    impl QueueBackend {
        fn new(replies: Vec<TranslationResult<String>>) -> Rc<Self> {
            Rc::new(Self {
                replies: RefCell::new(replies.into_iter().rev().collect()),
                calls: Cell::new(0),
            })
        }
    }

    #[async_trait(?Send)]
    impl TranslationBackend for QueueBackend {
        async fn fetch(&self, _text: &str, _src: &str, _tgt: &str) -> TranslationResult<String> {
            self.calls.set(self.calls.get() + 1);
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err(TranslationError::NetworkError("no reply".to_string())))
        }

        fn name(&self) -> &str {
            "queue"
        }
    }

    #[tokio::test]
    async fn test_success_is_normalized_and_cached() {
        let backend = QueueBackend::new(vec![Ok("\"Bonjour\"".to_string())]);
        let translator = Translator::new(TranslationCache::memory_only(), backend.clone(), "en");

        assert_eq!(translator.translate("Hello", "fr").await, "Bonjour");
        assert_eq!(translator.translate("Hello", "fr").await, "Bonjour");
        assert_eq!(backend.calls.get(), 1);

        let stats = translator.cache_stats();
        assert_eq!(stats.remote_successes, 1);
        assert_eq!(stats.memory_hits, 1);
    }

    #[tokio::test]
    async fn test_failure_returns_input_and_is_not_cached() {
        let backend = QueueBackend::new(vec![
            Err(TranslationError::HttpStatus(500)),
            Ok("Bonjour".to_string()),
        ]);
        let translator = Translator::new(TranslationCache::memory_only(), backend.clone(), "en");

        assert_eq!(translator.translate("Hello", "fr").await, "Hello");
        assert!(!translator.cache().contains_in_memory("Hello", "fr"));

        assert_eq!(translator.translate("Hello", "fr").await, "Bonjour");
        assert_eq!(backend.calls.get(), 2);
        assert_eq!(translator.cache_stats().remote_failures, 1);
    }

    #[tokio::test]
    async fn test_empty_translation_is_a_failure() {
        let backend = QueueBackend::new(vec![Ok("  \"\" ".to_string())]);
        let translator = Translator::new(TranslationCache::memory_only(), backend, "en");

        assert!(matches!(
            translator.try_translate("Hello", "fr").await,
            Err(TranslationError::MalformedResponse(_))
        ));
        assert_eq!(translator.cache().memory_len(), 0);
    }

    #[tokio::test]
    async fn test_blank_and_source_language_skip_lookup() {
        let backend = QueueBackend::new(vec![]);
        let translator = Translator::new(TranslationCache::memory_only(), backend.clone(), "en");

        assert_eq!(translator.translate("   ", "fr").await, "   ");
        assert_eq!(translator.translate("Hello", "en").await, "Hello");
        assert_eq!(backend.calls.get(), 0);
        assert_eq!(translator.cache_stats().total_requests(), 0);
    }

    #[tokio::test]
    async fn test_lookup_uses_trimmed_text() {
        let backend = QueueBackend::new(vec![Ok("Bonjour".to_string())]);
        let translator = Translator::new(TranslationCache::memory_only(), backend.clone(), "en");

        assert_eq!(translator.translate("  Hello\n", "fr").await, "Bonjour");
        assert_eq!(translator.translate("Hello", "fr").await, "Bonjour");
        assert_eq!(backend.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_target_language_case_shares_cache_entry() {
        let backend = QueueBackend::new(vec![Ok("Bonjour".to_string())]);
        let translator = Translator::new(TranslationCache::memory_only(), backend.clone(), "en");

        assert_eq!(translator.translate("Hello", "FR").await, "Bonjour");
        assert_eq!(translator.translate("Hello", "fr").await, "Bonjour");
        assert_eq!(translator.translate("Hello", "EN").await, "Hello");

        assert_eq!(backend.calls.get(), 1);
        assert!(translator.cache().contains_in_memory("Hello", "fr"));
        assert_eq!(translator.cache().memory_len(), 1);
    }
}
