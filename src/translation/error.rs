//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制。翻译链内部的错误都不会越过
//! [`TranslationChain::translate`](crate::translation::TranslationChain::translate)，
//! 这里的类型主要用于日志、配置加载和检查点读写。

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 翻译服务错误（请求失败或响应格式不对）
    #[error("翻译服务错误: {0}")]
    TranslationServiceError(String),

    /// 合并翻译后分段数量不一致
    #[error("分段数量不一致: 提交 {expected} 段, 返回 {actual} 段")]
    SegmentCountMismatch { expected: usize, actual: usize },

    /// 检查点错误
    #[error("检查点错误: {0}")]
    CheckpointError(String),

    /// 文件读写错误
    #[error("IO错误: {0}")]
    IoError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),
}

impl TranslationError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::NetworkError(_) => ErrorSeverity::Error,
            TranslationError::TranslationServiceError(_) => ErrorSeverity::Error,
            TranslationError::SegmentCountMismatch { .. } => ErrorSeverity::Warning,
            TranslationError::CheckpointError(_) => ErrorSeverity::Warning,
            TranslationError::IoError(_) => ErrorSeverity::Critical,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::ParseError(_) => ErrorSeverity::Error,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        let new_msg = format!("{} (上下文: {})", self, context);

        match self {
            TranslationError::ConfigError(_) => TranslationError::ConfigError(new_msg),
            TranslationError::NetworkError(_) => TranslationError::NetworkError(new_msg),
            TranslationError::TranslationServiceError(_) => {
                TranslationError::TranslationServiceError(new_msg)
            }
            TranslationError::CheckpointError(_) => TranslationError::CheckpointError(new_msg),
            TranslationError::IoError(_) => TranslationError::IoError(new_msg),
            TranslationError::SerializationError(_) => {
                TranslationError::SerializationError(new_msg)
            }
            TranslationError::ParseError(_) => TranslationError::ParseError(new_msg),
            mismatch @ TranslationError::SegmentCountMismatch { .. } => mismatch,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 标准错误转换
impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::ParseError(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<toml::ser::Error> for TranslationError {
    fn from(error: toml::ser::Error) -> Self {
        TranslationError::SerializationError(format!("TOML序列化错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            TranslationError::TranslationServiceError(format!("响应格式无效: {}", error))
        } else if error.is_status() {
            TranslationError::TranslationServiceError(error.to_string())
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }
    }

    /// 创建检查点错误
    pub fn checkpoint_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::CheckpointError(msg.to_string())
    }
}
