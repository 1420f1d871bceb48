//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型。页面级操作从不向调用方暴露这些错误，
//! 只在内部 API（后端、存储、配置）之间传递并最终记录日志。

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误（连接失败、读取响应体失败等）
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 远端返回了非成功的 HTTP 状态码
    #[error("HTTP 状态码异常: {0}")]
    HttpStatus(u16),

    /// 响应体无法解析或缺少必要字段
    #[error("响应格式错误: {0}")]
    MalformedResponse(String),

    /// 持久化存储错误
    #[error("存储错误: {0}")]
    StorageError(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),
}

impl TranslationError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::HttpStatus(_) => ErrorSeverity::Warning,
            TranslationError::MalformedResponse(_) => ErrorSeverity::Warning,
            TranslationError::StorageError(_) => ErrorSeverity::Warning,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::HttpStatus(_) => ErrorCategory::Service,
            TranslationError::MalformedResponse(_) => ErrorCategory::Parsing,
            TranslationError::StorageError(_) => ErrorCategory::Storage,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Service,
    Parsing,
    Storage,
    Input,
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) if !status.is_success() => TranslationError::HttpStatus(status.as_u16()),
            _ => TranslationError::NetworkError(error.to_string()),
        }
    }
}

impl From<url::ParseError> for TranslationError {
    fn from(error: url::ParseError) -> Self {
        TranslationError::ConfigError(format!("无效的 API URL: {}", error))
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::MalformedResponse(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ConfigError(format!("TOML解析错误: {}", error))
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::StorageError(format!("IO错误: {}", error))
    }
}

impl From<crate::env::EnvError> for TranslationError {
    fn from(error: crate::env::EnvError) -> Self {
        TranslationError::ConfigError(error.to_string())
    }
}

macro_rules! storage_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for TranslationError {
                fn from(error: $ty) -> Self {
                    TranslationError::StorageError(error.to_string())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::Error,
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误，不改变控制流
    pub fn log_error(error: &TranslationError, context: &str) {
        let category = error.category();
        match error.severity() {
            ErrorSeverity::Info => tracing::info!(?category, "{}: {}", context, error),
            ErrorSeverity::Warning => tracing::warn!(?category, "{}: {}", context, error),
            ErrorSeverity::Critical => {
                tracing::error!(?category, "{}: {}", context, error)
            }
        }
    }
}
