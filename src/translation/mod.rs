//! 翻译模块
//!
//! 在客户端翻译静态页面的可见文本，采用清晰的模块化架构：
//! - **core**: 远端客户端、翻译服务、页面引擎和站点入口
//! - **pipeline**: 文本处理管道（收集、过滤、批次）
//! - **storage**: 两级缓存、语言偏好和键值存储
//! - **controls**: 语言选择框和加载提示
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::rc::Rc;
//!
//! use page_translator::parsers::html::html_to_dom;
//! use page_translator::translation::{
//!     MemoryStore, MyMemoryBackend, SiteTranslator, TranslationConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dom = html_to_dom(b"<p>Hello world</p>", "utf-8");
//! let config = TranslationConfig::default();
//! let backend = Rc::new(MyMemoryBackend::new(&config.api_url)?);
//!
//! let site = SiteTranslator::new(dom.document.clone(), config, backend, Rc::new(MemoryStore::new()))?;
//! site.on_load().await;
//! site.on_language_change("fr").await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块 - 处理翻译相关的所有配置
///
/// 提供远端地址、语言列表、批次参数、缓存路径等配置
pub mod config;

/// 页面控件模块 - 语言选择框和加载提示
pub mod controls;

/// 核心翻译模块 - 客户端、服务、引擎和站点入口
pub mod core;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 文本处理管道模块 - 文本收集、过滤和批次切分
pub mod pipeline;

/// 存储管理模块 - 两级缓存、语言偏好和键值存储
pub mod storage;

// ============================================================================
// 重新导出
// ============================================================================

pub use config::{ConfigManager, TranslationConfig};
pub use controls::{LanguageSelector, LoadingIndicator};
pub use self::core::{
    MyMemoryBackend, PageOutcome, PageTranslator, SiteTranslator, SkipReason, TranslationBackend,
    Translator,
};
pub use error::{TranslationError, TranslationResult};
pub use pipeline::{TextCollector, TextFilter, TextRecord, TextRegistry};
pub use storage::{
    open_store, KeyValueStore, MemoryStore, PreferenceStore, RedbStore, TranslationCache,
};
