//! 翻译模块
//!
//! 把对话文本送进一条故意失真的多跳翻译链，再把结果整理回原来的字面量中：
//! - **core**: 翻译服务接口和多跳翻译链
//! - **pipeline**: 字面量切分、结果整理、检查点和调度
//! - **storage**: 带过期时间的缓存
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use eztr_garble::translation::{HttpTranslationBackend, TranslationChain, TranslationConfig};
//!
//! # async fn example() {
//! let config = TranslationConfig::default();
//! let chain = TranslationChain::new(HttpTranslationBackend::new(&config.api_url), &config);
//!
//! let garbled = chain.translate("Hello [A] friend", None).await;
//! assert!(garbled.contains("[A]"));
//! # }
//! ```

/// 配置管理模块
pub mod config;

/// 翻译服务接口和翻译链
pub mod core;

/// 错误类型和处理机制
pub mod error;

/// 字面量处理和调度
pub mod pipeline;

/// 缓存
pub mod storage;

pub use config::{constants, ConfigManager, TranslationConfig};

pub use self::core::{
    ChainStats, ChainStatsSnapshot, HttpTranslationBackend, TranslationBackend, TranslationChain,
};

pub use error::{ErrorSeverity, TranslationError, TranslationResult};

pub use pipeline::{
    extract_segments, reinsert, BlockProcessor, CheckpointRecord, CheckpointedScheduler,
    QuotedSegment, ResultReconciler, RunOutcome,
};

pub use storage::{CacheEntry, CacheStats, TranslationCache};
