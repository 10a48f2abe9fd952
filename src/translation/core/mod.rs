//! 翻译系统核心模块
//!
//! - **服务层** (`service.rs`): 单跳翻译服务的特性和 HTTP 实现
//! - **翻译链** (`chain.rs`): 多跳路径、占位符保护、缓存和统计
//!
//! ```text
//! TranslationChain (chain.rs)
//!     ├── TranslationBackend (service.rs)
//!     └── TranslationCache (storage/cache.rs)
//! ```

pub mod chain;
pub mod service;

pub use chain::{ChainStats, ChainStatsSnapshot, TranslationChain};
pub use service::{HttpTranslationBackend, TranslationBackend};
