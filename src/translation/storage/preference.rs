//! 语言偏好存储

use std::rc::Rc;

use super::store::KeyValueStore;
use crate::translation::config::constants;
use crate::translation::error::{helpers::log_error, TranslationError, TranslationResult};

/// 保存用户最后选择的语言
pub struct PreferenceStore {
    store: Rc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 读取保存的语言，读取失败按未设置处理
    pub fn load(&self) -> Option<String> {
        match self.store.get(constants::PREFERENCE_KEY) {
            Ok(value) => value
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty()),
            Err(e) => {
                log_error(&e, "读取语言偏好失败");
                None
            }
        }
    }

    /// 覆盖保存的语言，空白代码不会写入
    pub fn save(&self, lang: &str) -> TranslationResult<()> {
        let lang = lang.trim();
        if lang.is_empty() {
            return Err(TranslationError::InvalidInput("语言代码为空".to_string()));
        }

        self.store.set(constants::PREFERENCE_KEY, lang)?;
        tracing::debug!("保存语言偏好: {}", lang);
        Ok(())
    }

    /// 清除保存的语言
    pub fn clear(&self) -> TranslationResult<bool> {
        self.store.remove(constants::PREFERENCE_KEY)
    }
}
