//! 翻译系统核心模块
//!
//! 把文本收集、缓存查询、远端调用和 DOM 更新串成完整的页面翻译流程。
//!
//! ## 架构设计
//!
//! - **客户端层** (`client.rs`): 远端后端抽象和 MyMemory 实现
//! - **服务层** (`service.rs`): 缓存优先的单段翻译，失败时回退原文
//! - **引擎层** (`engine.rs`): 批次调度、DOM 更新和原文恢复
//! - **站点层** (`site.rs`): 页面加载与语言切换事件
//!
//! ## 模块依赖关系
//!
//! ```text
//! SiteTranslator (site.rs)
//!     ├── PreferenceStore (storage/preference.rs)
//!     ├── LanguageSelector (controls.rs)
//!     └── PageTranslator (engine.rs)
//!             ├── TextCollector (pipeline/collector.rs)
//!             ├── BatchManager (pipeline/batch.rs)
//!             └── Translator (service.rs)
//!                     ├── TranslationCache (storage/cache.rs)
//!                     └── TranslationBackend (client.rs)
//! ```

pub mod client;
pub mod engine;
pub mod service;
pub mod site;

// 重新导出核心类型和接口

/// 远端后端抽象和默认实现
pub use client::{normalize_translation, parse_response, MyMemoryBackend, TranslationBackend};

/// 页面翻译引擎
pub use engine::{PageOutcome, PageTranslator, SkipReason};

/// 缓存优先的翻译器
pub use service::Translator;

/// 站点级入口
pub use site::SiteTranslator;
