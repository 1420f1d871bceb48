//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    // 远端翻译服务
    pub const DEFAULT_API_URL: &str = "https://api.mymemory.translated.net/get";

    // 页面撰写所用的语言，切换回它即恢复原文
    pub const BASE_LANGUAGE: &str = "en";

    // 批次处理相关
    pub const BATCH_SIZE: usize = 8;
    pub const BATCH_DELAY_MS: u64 = 300;
    pub const INITIAL_DELAY_MS: u64 = 500;

    // 文本过滤相关
    pub const MIN_TEXT_LENGTH: usize = 2;

    // 持久化键
    pub const PREFERENCE_KEY: &str = "preferred_language";
    pub const CACHE_KEY_PREFIX: &str = "translation:";

    // 页面控件
    pub const LANGUAGE_SELECT_ID: &str = "language-select";
    pub const LOADING_INDICATOR_ID: &str = "translation-loading";
    pub const CURRENT_YEAR_ID: &str = "current-year";
    pub const CURRENT_YEAR_ATTR: &str = "data-current-year";
    pub const NO_TRANSLATE_CLASS: &str = "notranslate";

    // 没有语言选择控件时可选的语言
    pub const DEFAULT_LANGUAGES: &[&str] = &["en", "fr", "de", "es", "it", "pt", "ja", "zh"];

    // 跳过的元素
    pub const SKIP_ELEMENTS: &[&str] = &[
        "script", "style", "noscript", "template", "iframe", "svg", "math", "canvas", "video",
        "audio", "embed", "object", "img", "picture", "source", "track", "option", "select",
        "textarea", "code", "pre", "head",
    ];

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "page-translator.toml",
        ".page-translator.toml",
        "page-translator.json",
        "~/.config/page-translator/config.toml",
    ];
}
