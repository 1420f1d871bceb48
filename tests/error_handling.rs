//! 错误处理集成测试
//!
//! 远端失败、响应格式错误和配置错误都不应破坏页面

use std::rc::Rc;

use page_translator::translation::{
    ConfigManager, MemoryStore, MyMemoryBackend, PageOutcome, PageTranslator, TranslationBackend,
    TranslationCache, TranslationConfig, TranslationError, Translator,
};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{fast_config, paragraph_texts, parse, success_body, ScriptedBackend};

fn page(html: &str, backend: Rc<ScriptedBackend>) -> (markup5ever_rcdom::RcDom, PageTranslator) {
    let dom = parse(html);
    let translator = Translator::new(TranslationCache::memory_only(), backend, "en");
    let page = PageTranslator::new(dom.document.clone(), translator, &fast_config())
        .expect("Page translator should build");
    page.extract();
    (dom, page)
}

#[tokio::test]
async fn test_http_failure_leaves_node_unchanged() {
    let backend = ScriptedBackend::new();
    backend.fail("Price list", TranslationError::HttpStatus(503));
    let (dom, page) = page("<p>Price list</p><p>Opening hours</p>", backend.clone());

    let outcome = page.translate_page("fr").await;

    assert_eq!(
        outcome,
        PageOutcome::Translated {
            batches: 1,
            applied: 1,
            unchanged: 1
        }
    );
    assert_eq!(
        paragraph_texts(&dom),
        vec!["Price list", "[fr] Opening hours"]
    );

    let cache = page.translator().cache();
    assert!(!cache.contains_in_memory("Price list", "fr"), "Failures must not be cached");
    assert_eq!(cache.stats().remote_failures, 1);
    assert!(!page.is_busy());
}

#[tokio::test]
async fn test_malformed_bodies_fall_back_to_original() {
    let backend = ScriptedBackend::new();
    backend
        .reply("Not json", "<html>Service unavailable</html>")
        .reply(
            "Quota exceeded",
            r#"{"responseStatus": "403", "responseData": {"translatedText": "MYMEMORY WARNING"}}"#,
        )
        .reply("Missing data", r#"{"responseStatus": 200}"#)
        .reply("Only quotes", &success_body("\"\""));
    let (dom, page) = page(
        "<p>Not json</p><p>Quota exceeded</p><p>Missing data</p><p>Only quotes</p>",
        backend.clone(),
    );

    let outcome = page.translate_page("de").await;

    assert!(matches!(
        outcome,
        PageOutcome::Translated {
            applied: 0,
            unchanged: 4,
            ..
        }
    ));
    assert_eq!(
        paragraph_texts(&dom),
        vec!["Not json", "Quota exceeded", "Missing data", "Only quotes"]
    );
    assert_eq!(page.translator().cache().memory_len(), 0);
}

#[tokio::test]
async fn test_string_status_200_is_accepted() {
    let backend = ScriptedBackend::new();
    backend.reply(
        "Welcome",
        r#"{"responseStatus": "200", "responseData": {"translatedText": "Willkommen"}}"#,
    );
    let translator = Translator::new(TranslationCache::memory_only(), backend, "en");

    assert_eq!(translator.translate("Welcome", "de").await, "Willkommen");
}

/// 失败不写缓存，所以恢复后的下一次切换会重新请求
#[tokio::test]
async fn test_failure_is_retried_on_next_switch() {
    let backend = ScriptedBackend::new();
    backend.fail(
        "Book a table",
        TranslationError::NetworkError("connection reset".to_string()),
    );
    let (dom, page) = page("<p>Book a table</p>", backend.clone());

    page.translate_page("fr").await;
    assert_eq!(paragraph_texts(&dom), vec!["Book a table"]);

    page.translate_page("en").await;
    backend.heal();
    page.translate_page("fr").await;

    assert_eq!(paragraph_texts(&dom), vec!["[fr] Book a table"]);
    assert_eq!(backend.calls_for("Book a table"), 2);
}

#[tokio::test]
async fn test_unreachable_endpoint_returns_original() {
    // 端口 9 (discard) 在测试环境中不会监听
    let backend = MyMemoryBackend::new("http://127.0.0.1:9/get").unwrap();

    let result = backend.fetch("Hello world", "en", "fr").await;
    assert!(matches!(result, Err(TranslationError::NetworkError(_))));

    let translator = Translator::new(TranslationCache::memory_only(), Rc::new(backend), "en");
    assert_eq!(translator.translate("Hello world", "fr").await, "Hello world");
    assert_eq!(translator.cache_stats().remote_failures, 1);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "batch_size = \"eight\"\n[[[").unwrap();
    assert!(matches!(
        ConfigManager::from_path(&broken),
        Err(TranslationError::ConfigError(_))
    ));

    let zero_batch = dir.path().join("zero.toml");
    std::fs::write(&zero_batch, "batch_size = 0\n").unwrap();
    assert!(matches!(
        ConfigManager::from_path(&zero_batch),
        Err(TranslationError::ConfigError(_))
    ));

    assert!(ConfigManager::from_path(dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_site_rejects_invalid_config() {
    let dom = parse("<p>Hello world</p>");
    let config = TranslationConfig {
        batch_size: 0,
        ..Default::default()
    };

    let result = page_translator::translation::SiteTranslator::new(
        dom.document.clone(),
        config,
        ScriptedBackend::new(),
        Rc::new(MemoryStore::new()),
    );
    assert!(matches!(result, Err(TranslationError::ConfigError(_))));
}
