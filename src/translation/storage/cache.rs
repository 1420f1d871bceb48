//! 翻译缓存模块
//!
//! 两级缓存：进程内的 HashMap 和可选的持久化键值存储。
//! 条目永不过期，只在远端调用成功后写入。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::store::KeyValueStore;
use crate::translation::config::constants;
use crate::translation::error::{helpers::log_error, TranslationError, TranslationResult};

/// 持久化的缓存条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub source_text: String,
    pub target_lang: String,
    pub translated_text: String,
}

impl CacheEntry {
    pub fn new(source_text: &str, target_lang: &str, translated_text: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            target_lang: target_lang.to_string(),
            translated_text: translated_text.to_string(),
        }
    }

    /// 生成缓存键
    pub fn cache_key(&self) -> String {
        cache_key(&self.source_text, &self.target_lang)
    }
}

/// 持久化层的键：`translation:{lang}:{blake3(text)}`
pub fn cache_key(source_text: &str, target_lang: &str) -> String {
    format!(
        "{}{}:{}",
        constants::CACHE_KEY_PREFIX,
        target_lang,
        blake3::hash(source_text.as_bytes()).to_hex()
    )
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub persisted_hits: u64,
    pub misses: u64,
    pub remote_successes: u64,
    pub remote_failures: u64,
}

impl CacheStats {
    /// 总查询次数
    pub fn total_requests(&self) -> u64 {
        self.memory_hits + self.persisted_hits + self.misses
    }
}

/// 翻译缓存
pub struct TranslationCache {
    memory: RefCell<HashMap<(String, String), String>>,
    persisted: Option<Rc<dyn KeyValueStore>>,
    stats: RefCell<CacheStats>,
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::memory_only()
    }
}

impl TranslationCache {
    /// 只有内存层的缓存
    pub fn memory_only() -> Self {
        Self {
            memory: RefCell::new(HashMap::new()),
            persisted: None,
            stats: RefCell::new(CacheStats::default()),
        }
    }

    /// 带持久化层的缓存
    pub fn with_store(store: Rc<dyn KeyValueStore>) -> Self {
        Self {
            persisted: Some(store),
            ..Self::memory_only()
        }
    }

    /// 查找译文：先查内存层，再查持久化层，命中持久化层时回填内存层
    pub fn get(&self, source_text: &str, target_lang: &str) -> Option<String> {
        let key = (source_text.to_string(), target_lang.to_string());

        if let Some(hit) = self.memory.borrow().get(&key) {
            self.stats.borrow_mut().memory_hits += 1;
            return Some(hit.clone());
        }

        if let Some(store) = &self.persisted {
            match Self::read_persisted(store.as_ref(), source_text, target_lang) {
                Ok(Some(translated)) => {
                    self.stats.borrow_mut().persisted_hits += 1;
                    self.memory.borrow_mut().insert(key, translated.clone());
                    return Some(translated);
                }
                Ok(None) => {}
                Err(e) => log_error(&e, "读取持久化缓存失败"),
            }
        }

        self.stats.borrow_mut().misses += 1;
        None
    }

    fn read_persisted(
        store: &dyn KeyValueStore,
        source_text: &str,
        target_lang: &str,
    ) -> TranslationResult<Option<String>> {
        let Some(raw) = store.get(&cache_key(source_text, target_lang))? else {
            return Ok(None);
        };

        let entry: CacheEntry = serde_json::from_str(&raw)?;
        if entry.source_text != source_text || entry.target_lang != target_lang {
            tracing::warn!("缓存键冲突，忽略条目: {:?}", entry.source_text);
            return Ok(None);
        }

        Ok(Some(entry.translated_text))
    }

    /// 写入两级缓存，持久化失败只记录日志
    pub fn put(&self, source_text: &str, target_lang: &str, translated_text: &str) {
        self.memory.borrow_mut().insert(
            (source_text.to_string(), target_lang.to_string()),
            translated_text.to_string(),
        );

        if let Some(store) = &self.persisted {
            let entry = CacheEntry::new(source_text, target_lang, translated_text);
            let result = serde_json::to_string(&entry)
                .map_err(TranslationError::from)
                .and_then(|raw| store.set(&entry.cache_key(), &raw));

            if let Err(e) = result {
                log_error(&e, "写入持久化缓存失败");
            }
        }
    }

    /// 内存层是否持有该条目
    pub fn contains_in_memory(&self, source_text: &str, target_lang: &str) -> bool {
        self.memory
            .borrow()
            .contains_key(&(source_text.to_string(), target_lang.to_string()))
    }

    /// 内存层条目数
    pub fn memory_len(&self) -> usize {
        self.memory.borrow().len()
    }

    /// 持久化层中某个目标语言的条目数
    pub fn persisted_len(&self, target_lang: &str) -> usize {
        let Some(store) = &self.persisted else {
            return 0;
        };

        let prefix = format!("{}{}:", constants::CACHE_KEY_PREFIX, target_lang);
        match store.keys_with_prefix(&prefix) {
            Ok(keys) => keys.len(),
            Err(e) => {
                log_error(&e, "列出持久化缓存失败");
                0
            }
        }
    }

    pub fn has_persisted_tier(&self) -> bool {
        self.persisted.is_some()
    }

    /// 记录远端调用结果
    pub fn record_remote(&self, success: bool) {
        let mut stats = self.stats.borrow_mut();
        if success {
            stats.remote_successes += 1;
        } else {
            stats.remote_failures += 1;
        }
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        self.stats.borrow().clone()
    }
}
