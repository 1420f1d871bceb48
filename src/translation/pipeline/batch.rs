//! 翻译批次管理器模块
//!
//! 把已登记的文本节点按文档顺序切成固定大小的批次。批次内的请求并发执行，
//! 批次之间严格串行，中间插入固定的停顿。

use std::time::Duration;

use crate::translation::config::{constants, TranslationConfig};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::collector::TextItem;

/// 翻译批次
#[derive(Debug, Clone)]
pub struct Batch {
    /// 从 0 开始的批次序号
    pub index: usize,
    /// 包含的文本项
    pub items: Vec<TextItem>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

}

/// 批次管理器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchManagerConfig {
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for BatchManagerConfig {
    fn default() -> Self {
        Self {
            batch_size: constants::BATCH_SIZE,
            batch_delay: Duration::from_millis(constants::BATCH_DELAY_MS),
        }
    }
}

impl From<&TranslationConfig> for BatchManagerConfig {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            batch_delay: config.batch_delay(),
        }
    }
}

/// 批次管理器
#[derive(Debug, Clone)]
pub struct BatchManager {
    config: BatchManagerConfig,
}

impl Default for BatchManager {
    fn default() -> Self {
        Self {
            config: BatchManagerConfig::default(),
        }
    }
}

impl BatchManager {
    /// 创建批次管理器，批次大小必须大于 0
    pub fn new(config: BatchManagerConfig) -> TranslationResult<Self> {
        if config.batch_size == 0 {
            return Err(TranslationError::ConfigError("批次大小不能为0".to_string()));
        }
        Ok(Self { config })
    }

    /// 按文档顺序切分批次
    pub fn create_batches(&self, items: &[TextItem]) -> Vec<Batch> {
        items
            .chunks(self.config.batch_size)
            .enumerate()
            .map(|(index, chunk)| Batch {
                index,
                items: chunk.to_vec(),
            })
            .collect()
    }

    /// 指定批次之后是否需要停顿（最后一批之后不停顿）
    pub fn needs_delay_after(&self, batch: &Batch, total_batches: usize) -> bool {
        !self.config.batch_delay.is_zero() && batch.index + 1 < total_batches
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn batch_delay(&self) -> Duration {
        self.config.batch_delay
    }
}
