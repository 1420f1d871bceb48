//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 远端服务
    pub api_url: String,
    pub source_lang: String,

    // 页面语言
    pub base_lang: String,
    pub languages: Vec<String>,

    // 批次配置
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub initial_delay_ms: u64,

    // 提取配置
    pub min_text_length: usize,

    // 缓存配置
    pub cache_enabled: bool,
    pub cache_path: Option<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            source_lang: constants::BASE_LANGUAGE.to_string(),

            base_lang: constants::BASE_LANGUAGE.to_string(),
            languages: constants::DEFAULT_LANGUAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),

            batch_size: constants::BATCH_SIZE,
            batch_delay_ms: constants::BATCH_DELAY_MS,
            initial_delay_ms: constants::INITIAL_DELAY_MS,

            min_text_length: constants::MIN_TEXT_LENGTH,

            cache_enabled: true,
            cache_path: None,
        }
    }
}

impl TranslationConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.batch_size == 0 {
            return Err(TranslationError::ConfigError("批次大小不能为0".to_string()));
        }

        if self.min_text_length == 0 {
            return Err(TranslationError::ConfigError(
                "最小文本长度不能为0".to_string(),
            ));
        }

        if self.base_lang.trim().is_empty() || self.source_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("语言代码不能为空".to_string()));
        }

        url::Url::parse(&self.api_url)?;

        Ok(())
    }

    /// 应用环境变量覆盖
    ///
    /// 设置了但无法解析的变量视为配置错误
    pub fn apply_env_overrides(&mut self) -> TranslationResult<()> {
        use crate::env::{cache, translation, EnvVar};

        if let Some(api_url) = translation::ApiUrl::get_if_set()? {
            self.api_url = api_url;
            tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
        }

        if let Some(base_lang) = translation::BaseLang::get_if_set()? {
            self.base_lang = base_lang;
        }

        if let Some(batch_size) = translation::BatchSize::get_if_set()? {
            self.batch_size = batch_size;
        }

        if let Some(delay) = translation::BatchDelay::get_if_set()? {
            self.batch_delay_ms = delay.as_millis() as u64;
        }

        if let Some(enabled) = cache::Enabled::get_if_set()? {
            self.cache_enabled = enabled;
        }

        if let Some(path) = cache::Path::get_if_set()? {
            self.cache_path = Some(path);
        }

        Ok(())
    }

    /// 批次间延迟
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// 首次渲染后启动翻译前的延迟
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// 判断语言代码是否为页面的基础语言
    pub fn is_base_language(&self, lang: &str) -> bool {
        lang.eq_ignore_ascii_case(&self.base_lang)
    }

    /// 展开 `~` 后的持久化数据库路径（缓存禁用时为 None）
    pub fn resolved_cache_path(&self) -> Option<PathBuf> {
        if !self.cache_enabled {
            return None;
        }
        self.cache_path
            .as_deref()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建新的配置管理器：.env → 配置文件 → 环境变量覆盖 → 验证
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let (config, source) = match Self::find_config_file() {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path.display());
                (Self::load_from_file(&path)?, Some(path))
            }
            None => {
                tracing::debug!("未找到配置文件，使用默认配置");
                (TranslationConfig::default(), None)
            }
        };

        Self::finish(config, source)
    }

    /// 从指定文件创建配置管理器（仍然应用环境变量覆盖）
    pub fn from_path<P: AsRef<Path>>(path: P) -> TranslationResult<Self> {
        Self::load_dotenv();

        let path = path.as_ref().to_path_buf();
        let config = Self::load_from_file(&path)?;
        Self::finish(config, Some(path))
    }

    fn finish(mut config: TranslationConfig, source: Option<PathBuf>) -> TranslationResult<Self> {
        config.apply_env_overrides()?;
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 取出配置
    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 配置来源文件（使用默认值时为 None）
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn find_config_file() -> Option<PathBuf> {
        constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists())
    }

    /// 从指定文件加载配置
    pub fn load_from_file(path: &Path) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("读取配置文件失败 {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::debug!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
