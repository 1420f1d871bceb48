//! 页面翻译引擎
//!
//! 持有页面文档、文本登记表和翻译器。`translate_page` 把登记的节点按批次送去翻译，
//! 每个节点的译文一到就写回 DOM；切回基础语言时把所有节点恢复为原文。

use std::cell::{Cell, Ref, RefCell};

use futures::future::join_all;
use markup5ever_rcdom::Handle;

use super::service::Translator;
use crate::translation::config::TranslationConfig;
use crate::translation::controls::LoadingIndicator;
use crate::translation::error::TranslationResult;
use crate::translation::pipeline::{
    BatchManager, BatchManagerConfig, CollectorConfig, TextCollector, TextItem, TextRegistry,
};

/// 未执行翻译的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 另一次翻译仍在进行
    Busy,
    /// 页面已经是目标语言
    AlreadyActive,
}

/// 一次 `translate_page` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Skipped(SkipReason),
    Restored {
        nodes: usize,
    },
    Translated {
        batches: usize,
        applied: usize,
        unchanged: usize,
    },
}

/// 运行期间置位忙标志并显示加载提示，离开作用域时撤销
struct BusyGuard<'a> {
    flag: &'a Cell<bool>,
    indicator: &'a LoadingIndicator,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a Cell<bool>, indicator: &'a LoadingIndicator) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        indicator.show();
        Some(Self { flag, indicator })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.indicator.hide();
        self.flag.set(false);
    }
}

/// 页面翻译引擎
pub struct PageTranslator {
    document: Handle,
    registry: RefCell<TextRegistry>,
    collector: RefCell<TextCollector>,
    translator: Translator,
    batches: BatchManager,
    indicator: LoadingIndicator,
    base_lang: String,
    current_lang: RefCell<String>,
    busy: Cell<bool>,
}

impl PageTranslator {
    pub fn new(
        document: Handle,
        translator: Translator,
        config: &TranslationConfig,
    ) -> TranslationResult<Self> {
        let batches = BatchManager::new(BatchManagerConfig::from(config))?;
        let indicator = LoadingIndicator::find(&document);

        Ok(Self {
            document,
            registry: RefCell::new(TextRegistry::new()),
            collector: RefCell::new(TextCollector::new(CollectorConfig::from(config))),
            translator,
            batches,
            indicator,
            base_lang: config.base_lang.clone(),
            current_lang: RefCell::new(config.base_lang.clone()),
            busy: Cell::new(false),
        })
    }

    /// 收集页面文本，返回新登记的节点数
    pub fn extract(&self) -> usize {
        let added = self
            .collector
            .borrow_mut()
            .collect(&self.document, &mut self.registry.borrow_mut());
        tracing::info!("登记了 {} 个可翻译文本节点", self.registry.borrow().len());
        added
    }

    /// 把页面翻译为目标语言，目标为基础语言时恢复原文
    pub async fn translate_page(&self, target_lang: &str) -> PageOutcome {
        if self.busy.get() {
            tracing::debug!("翻译进行中，忽略切换到 {}", target_lang);
            return PageOutcome::Skipped(SkipReason::Busy);
        }

        if self.current_lang.borrow().eq_ignore_ascii_case(target_lang) {
            tracing::debug!("页面已经是 {}", target_lang);
            return PageOutcome::Skipped(SkipReason::AlreadyActive);
        }

        let Some(_guard) = BusyGuard::acquire(&self.busy, &self.indicator) else {
            return PageOutcome::Skipped(SkipReason::Busy);
        };

        if self.is_base_language(target_lang) {
            let nodes = self.restore_nodes();
            self.set_current_language(target_lang);
            tracing::info!("已恢复原文: {} 个节点", nodes);
            return PageOutcome::Restored { nodes };
        }

        let outcome = self.translate_batches(target_lang).await;
        self.set_current_language(target_lang);
        outcome
    }

    async fn translate_batches(&self, target_lang: &str) -> PageOutcome {
        // 克隆句柄，避免跨 await 持有 RefCell 借用
        let items: Vec<TextItem> = self.registry.borrow().items().to_vec();
        let batches = self.batches.create_batches(&items);
        let from_base = self.is_base_language(&self.current_lang.borrow());

        tracing::info!(
            "开始翻译到 {}: {} 个节点, {} 个批次",
            target_lang,
            items.len(),
            batches.len()
        );

        let mut applied = 0;
        let mut unchanged = 0;

        for batch in batches.iter() {
            let pending: Vec<&TextItem> = batch
                .items
                .iter()
                .filter(|item| {
                    let attached = item.is_attached();
                    if !attached {
                        tracing::debug!("节点 #{} 已脱离文档，跳过", item.record.id);
                    }
                    attached
                })
                .collect();

            if !from_base {
                for item in pending.iter() {
                    item.restore();
                }
            }

            let results = join_all(
                pending
                    .iter()
                    .map(|item| self.translate_item(item, target_lang)),
            )
            .await;
            let batch_applied = results.iter().filter(|&&changed| changed).count();
            applied += batch_applied;
            unchanged += results.len() - batch_applied;

            tracing::debug!(
                "批次 {}/{} 完成: {} 个节点更新",
                batch.index + 1,
                batches.len(),
                batch_applied
            );

            if self.batches.needs_delay_after(batch, batches.len()) {
                tokio::time::sleep(self.batches.batch_delay()).await;
            }
        }

        tracing::info!(
            "翻译到 {} 完成: {} 个节点更新, {} 个保持原文",
            target_lang,
            applied,
            unchanged
        );

        PageOutcome::Translated {
            batches: batches.len(),
            applied,
            unchanged,
        }
    }

    /// 翻译单个节点，译文与原文不同时立即写回
    async fn translate_item(&self, item: &TextItem, target_lang: &str) -> bool {
        let source = item.record.source_text();
        let translated = self.translator.translate(source, target_lang).await;

        if translated == source || !item.is_attached() {
            return false;
        }

        item.apply(&item.record.wrap_translation(&translated))
    }

    /// 恢复所有节点为原文，不检查忙标志
    pub fn restore(&self) -> usize {
        let nodes = self.restore_nodes();
        self.set_current_language(&self.base_lang);
        nodes
    }

    fn restore_nodes(&self) -> usize {
        self.registry.borrow().restore_all()
    }

    fn set_current_language(&self, lang: &str) {
        *self.current_lang.borrow_mut() = lang.to_string();
    }

    pub fn is_base_language(&self, lang: &str) -> bool {
        lang.eq_ignore_ascii_case(&self.base_lang)
    }

    pub fn current_language(&self) -> String {
        self.current_lang.borrow().clone()
    }

    pub fn base_language(&self) -> &str {
        &self.base_lang
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn document(&self) -> &Handle {
        &self.document
    }

    pub fn registry(&self) -> Ref<'_, TextRegistry> {
        self.registry.borrow()
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn indicator(&self) -> &LoadingIndicator {
        &self.indicator
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use async_trait::async_trait;

    use super::*;
    use crate::parsers::html::dom::{find_nodes, get_text_content, html_to_dom};
    use crate::translation::core::client::TranslationBackend;
    use crate::translation::error::TranslationError;
    use crate::translation::storage::TranslationCache;

    /// 把文本转成大写并加上语言前缀，"Skip" 开头的文本返回错误
    struct UpperBackend;

    #[async_trait(?Send)]
    impl TranslationBackend for UpperBackend {
        async fn fetch(&self, text: &str, _src: &str, tgt: &str) -> TranslationResult<String> {
            if text.starts_with("Skip") {
                return Err(TranslationError::HttpStatus(503));
            }
            Ok(format!("[{}] {}", tgt, text.to_uppercase()))
        }

        fn name(&self) -> &str {
            "upper"
        }
    }

    fn page(html: &str) -> (markup5ever_rcdom::RcDom, PageTranslator) {
        let dom = html_to_dom(html.as_bytes(), "utf-8");
        let translator = Translator::new(TranslationCache::memory_only(), Rc::new(UpperBackend), "en");
        let config = TranslationConfig {
            batch_delay_ms: 0,
            ..Default::default()
        };
        let page = PageTranslator::new(dom.document.clone(), translator, &config).unwrap();
        page.extract();
        (dom, page)
    }

    fn paragraphs(dom: &markup5ever_rcdom::RcDom) -> Vec<String> {
        find_nodes(&dom.document, &["p"])
            .iter()
            .map(get_text_content)
            .collect()
    }

    #[tokio::test]
    async fn test_translate_and_restore() {
        let (dom, page) = page("<p> Hello world </p><p>Skip this one</p>");

        let outcome = page.translate_page("fr").await;
        assert_eq!(
            outcome,
            PageOutcome::Translated {
                batches: 1,
                applied: 1,
                unchanged: 1
            }
        );
        assert_eq!(paragraphs(&dom), vec![" [fr] HELLO WORLD ", "Skip this one"]);
        assert_eq!(page.current_language(), "fr");
        assert!(!page.is_busy());

        let outcome = page.translate_page("en").await;
        assert_eq!(outcome, PageOutcome::Restored { nodes: 1 });
        assert_eq!(paragraphs(&dom), vec![" Hello world ", "Skip this one"]);
        assert_eq!(page.current_language(), "en");
    }

    #[tokio::test]
    async fn test_same_language_is_skipped() {
        let (_dom, page) = page("<p>Hello world</p>");

        assert_eq!(
            page.translate_page("en").await,
            PageOutcome::Skipped(SkipReason::AlreadyActive)
        );

        page.translate_page("de").await;
        assert_eq!(
            page.translate_page("DE").await,
            PageOutcome::Skipped(SkipReason::AlreadyActive)
        );
    }

    #[tokio::test]
    async fn test_switching_between_targets_translates_from_original() {
        let (dom, page) = page("<p>Hello world</p>");

        page.translate_page("fr").await;
        page.translate_page("de").await;

        assert_eq!(paragraphs(&dom), vec!["[de] HELLO WORLD"]);
    }

    #[tokio::test]
    async fn test_busy_flag_skips_overlapping_run() {
        let (_dom, page) = page("<p>Hello world</p>");

        page.busy.set(true);
        assert_eq!(
            page.translate_page("fr").await,
            PageOutcome::Skipped(SkipReason::Busy)
        );
        assert_eq!(page.current_language(), "en");
    }

    #[tokio::test]
    async fn test_detached_nodes_are_skipped() {
        let (dom, page) = page("<p>Hello world</p><p>Goodbye world</p>");

        let body = find_nodes(&dom.document, &["html", "body"]).remove(0);
        let removed = body.children.borrow_mut().remove(1);
        removed.parent.set(None);

        let outcome = page.translate_page("fr").await;
        assert_eq!(
            outcome,
            PageOutcome::Translated {
                batches: 1,
                applied: 1,
                unchanged: 0
            }
        );
    }

    #[tokio::test]
    async fn test_restore_without_translation_is_noop() {
        let (dom, page) = page("<p>Hello world</p>");
        assert_eq!(page.restore(), 0);
        assert_eq!(paragraphs(&dom), vec!["Hello world"]);
    }
}
