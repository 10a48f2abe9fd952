//! 翻译缓存模块
//!
//! 以原文为键缓存整条翻译链的结果。每个条目在插入时带上自己的过期时间，
//! 过期只会移除条目，已经返回给调用方的值不受影响。

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub translated_text: String,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(translated_text: String, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            translated_text,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// 检查条目是否过期
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_entries: usize,
    pub evictions: u64,
}

impl CacheStats {
    /// 计算缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_requests as f64
        }
    }
}

/// 翻译缓存
///
/// 随流水线一起创建，随流水线一起销毁，不存在全局实例。
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: RwLock<CacheStats>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries_read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn entries_write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    fn stats_write(&self) -> RwLockWriteGuard<'_, CacheStats> {
        self.stats.write().unwrap_or_else(|e| e.into_inner())
    }

    /// 获取缓存条目，过期条目在这里被移除
    pub fn get(&self, text: &str) -> Option<String> {
        let hit = {
            let entries = self.entries_read();
            entries
                .get(text)
                .map(|entry| (!entry.is_expired()).then(|| entry.translated_text.clone()))
        };

        let mut stats = self.stats_write();
        stats.total_requests += 1;

        match hit {
            Some(Some(translated)) => {
                stats.cache_hits += 1;
                Some(translated)
            }
            Some(None) => {
                stats.cache_misses += 1;
                stats.evictions += 1;
                drop(stats);
                self.entries_write().remove(text);
                None
            }
            None => {
                stats.cache_misses += 1;
                None
            }
        }
    }

    /// 插入缓存条目
    pub fn insert(&self, original: String, translated: String, ttl: Duration) {
        let mut entries = self.entries_write();
        entries.insert(original, CacheEntry::new(translated, ttl));

        self.stats_write().total_entries = entries.len();
    }

    /// 清理过期条目
    pub fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries_write();
        let initial_size = entries.len();

        entries.retain(|_, entry| !entry.is_expired());

        let removed = initial_size - entries.len();

        let mut stats = self.stats_write();
        stats.total_entries = entries.len();
        stats.evictions += removed as u64;

        removed
    }

    /// 获取统计信息
    pub fn get_stats(&self) -> CacheStats {
        let mut result = self.stats.read().unwrap_or_else(|e| e.into_inner()).clone();
        result.total_entries = self.entries_read().len();
        result
    }

    /// 获取缓存大小
    pub fn size(&self) -> usize {
        self.entries_read().len()
    }
}
