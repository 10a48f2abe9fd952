//! 存储模块
//!
//! 提供带过期时间的翻译结果缓存。

pub mod cache;

pub use cache::{CacheEntry, CacheStats, TranslationCache};
