//! 键值存储
//!
//! 持久化缓存层和语言偏好共用同一个键值存储。`RedbStore` 把数据写入磁盘上的
//! redb 数据库，`MemoryStore` 只保存在进程内。

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::translation::error::TranslationResult;

const KV_TABLE: TableDefinition<&str, &str> = TableDefinition::new("kv");

/// 字符串键值存储
pub trait KeyValueStore {
    /// 读取键对应的值
    fn get(&self, key: &str) -> TranslationResult<Option<String>>;

    /// 写入键值，覆盖已有值
    fn set(&self, key: &str, value: &str) -> TranslationResult<()>;

    /// 删除键，返回键是否存在
    fn remove(&self, key: &str) -> TranslationResult<bool>;

    /// 列出所有以 `prefix` 开头的键，按字典序
    fn keys_with_prefix(&self, prefix: &str) -> TranslationResult<Vec<String>>;
}

/// 进程内存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> TranslationResult<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn keys_with_prefix(&self, prefix: &str) -> TranslationResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .borrow()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// 基于 redb 的磁盘存储
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// 打开或创建数据库文件
    pub fn open<P: AsRef<Path>>(path: P) -> TranslationResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(path)?;

        // 先建表，之后的读事务不必处理表不存在的情况
        let txn = db.begin_write()?;
        txn.open_table(KV_TABLE)?;
        txn.commit()?;

        tracing::debug!("打开持久化存储: {}", path.display());
        Ok(Self { db })
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(KV_TABLE)?;
        let value = table.get(key)?.map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(KV_TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> TranslationResult<bool> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(KV_TABLE)?;
            let removed = table.remove(key)?;
            removed.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }

    fn keys_with_prefix(&self, prefix: &str) -> TranslationResult<Vec<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(KV_TABLE)?;

        let mut keys = Vec::new();
        for entry in table.range(prefix..)? {
            let (key, _) = entry?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }

        Ok(keys)
    }
}
