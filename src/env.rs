//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，配置管理器用它覆盖文件配置

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: format!(
                            "Required environment variable not set ({})",
                            Self::DESCRIPTION
                        ),
                    })
                }
            }
        }
    }

    /// 仅当变量被显式设置时返回值
    ///
    /// 设置了但无法解析的值会返回错误，未设置时返回 `Ok(None)`
    fn get_if_set() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "PAGE_TRANSLATOR_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "PAGE_TRANSLATOR_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 页面的基础语言
    pub struct BaseLang;
    impl EnvVar<String> for BaseLang {
        const NAME: &'static str = "PAGE_TRANSLATOR_BASE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Language the page is authored in (ISO 639-1 code)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_language_code(value, Self::NAME)
        }
    }

    /// 每个批次的节点数
    pub struct BatchSize;
    impl EnvVar<usize> for BatchSize {
        const NAME: &'static str = "PAGE_TRANSLATOR_BATCH_SIZE";
        const DEFAULT: Option<usize> = Some(8);
        const DESCRIPTION: &'static str = "Number of text nodes translated concurrently per batch";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 256)
        }
    }

    /// 批次间延迟
    pub struct BatchDelay;
    impl EnvVar<Duration> for BatchDelay {
        const NAME: &'static str = "PAGE_TRANSLATOR_BATCH_DELAY_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(300));
        const DESCRIPTION: &'static str = "Pause between batches in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis: u64 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number of milliseconds".to_string(),
            })?;

            if millis > 60_000 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Delay too long (max 60000 ms)".to_string(),
                });
            }

            Ok(Duration::from_millis(millis))
        }
    }
}

/// 缓存相关环境变量
pub mod cache {
    use super::*;

    /// 缓存启用状态
    pub struct Enabled;
    impl EnvVar<bool> for Enabled {
        const NAME: &'static str = "PAGE_TRANSLATOR_CACHE_ENABLED";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Enable the persisted translation cache";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 持久化数据库路径
    pub struct Path;
    impl EnvVar<String> for Path {
        const NAME: &'static str = "PAGE_TRANSLATOR_CACHE_PATH";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path of the redb file holding cached translations";

        fn parse(value: &str) -> EnvResult<String> {
            let path = value.trim();
            if path.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Path cannot be empty".to_string(),
                });
            }
            Ok(shellexpand::tilde(path).into_owned())
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_language_code(value: &str, var_name: &str) -> EnvResult<String> {
    let lang = value.trim().to_lowercase();
    let valid = (2..=3).contains(&lang.len()) && lang.chars().all(|c| c.is_ascii_lowercase());
    if !valid {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Language code must be 2 or 3 letters (ISO 639)".to_string(),
        });
    }
    Ok(lang)
}
