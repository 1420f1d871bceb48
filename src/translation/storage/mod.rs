//! 存储模块
//!
//! 提供翻译缓存、语言偏好和底层的键值存储。

pub mod cache;
pub mod preference;
pub mod store;

use std::path::Path;
use std::rc::Rc;

pub use cache::{cache_key, CacheEntry, CacheStats, TranslationCache};
pub use preference::PreferenceStore;
pub use store::{KeyValueStore, MemoryStore, RedbStore};

use crate::translation::error::helpers::log_error;

/// 打开持久化存储，没有路径或打开失败时退回内存存储
pub fn open_store(path: Option<&Path>) -> Rc<dyn KeyValueStore> {
    let Some(path) = path else {
        tracing::debug!("未配置持久化缓存，使用内存存储");
        return Rc::new(MemoryStore::new());
    };

    match RedbStore::open(path) {
        Ok(store) => Rc::new(store),
        Err(e) => {
            log_error(&e, &format!("无法打开持久化缓存 {}", path.display()));
            Rc::new(MemoryStore::new())
        }
    }
}
