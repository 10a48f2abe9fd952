//! 多跳翻译链
//!
//! 一段文本依次经过 `源语言 → 若干随机中间语言 → 目标语言`，每一跳都是一次独立请求。
//! 目标语言默认与源语言相同，来回翻译造成的语义漂移正是想要的效果。
//!
//! 处理顺序：
//!
//! 1. 空白、单字符、可忽略短语、`undefined` 直接原样返回
//! 2. 缓存命中直接返回
//! 3. 文本中的包裹短语（按键图标）被切出来原样保留，只翻译其余部分
//! 4. 去掉首尾空白，按随机路径逐跳请求，任何一跳失败都返回原文
//! 5. 恢复首尾空白，以随机存活时间写入缓存

use std::cmp::Reverse;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::service::TranslationBackend;
use crate::translation::config::TranslationConfig;
use crate::translation::error::helpers;
use crate::translation::storage::TranslationCache;

/// 翻译链统计
///
/// 使用原子计数，可以在多个工作单元之间共享。
#[derive(Debug, Default)]
pub struct ChainStats {
    pub cache_hits: AtomicUsize,
    pub short_circuits: AtomicUsize,
    pub hop_requests: AtomicUsize,
    pub chains_completed: AtomicUsize,
    pub failed_chains: AtomicUsize,
}

impl ChainStats {
    pub fn snapshot(&self) -> ChainStatsSnapshot {
        ChainStatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            short_circuits: self.short_circuits.load(Ordering::Relaxed),
            hop_requests: self.hop_requests.load(Ordering::Relaxed),
            chains_completed: self.chains_completed.load(Ordering::Relaxed),
            failed_chains: self.failed_chains.load(Ordering::Relaxed),
        }
    }
}

/// 统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainStatsSnapshot {
    pub cache_hits: usize,
    pub short_circuits: usize,
    pub hop_requests: usize,
    pub chains_completed: usize,
    pub failed_chains: usize,
}

impl fmt::Display for ChainStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "完成 {} 条翻译链, 失败 {}, 请求 {} 次, 缓存命中 {}, 直接返回 {}",
            self.chains_completed,
            self.failed_chains,
            self.hop_requests,
            self.cache_hits,
            self.short_circuits
        )
    }
}

enum Piece<'t> {
    Text(&'t str),
    Placeholder(&'t str),
}

/// 多跳翻译链
pub struct TranslationChain<B> {
    backend: B,
    cache: TranslationCache,
    rng: Mutex<SmallRng>,
    source_lang: String,
    target_lang: String,
    language_pool: Vec<String>,
    min_hops: usize,
    max_hops: usize,
    ignored_phrases: Vec<String>,
    wrapped_phrases: Vec<String>,
    cache_ttl: Duration,
    cache_ttl_jitter: Duration,
    stats: ChainStats,
}

impl<B: TranslationBackend> TranslationChain<B> {
    /// 按配置创建；配置了种子时路径可复现
    pub fn new(backend: B, config: &TranslationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self::with_rng(backend, config, rng)
    }

    /// 使用外部提供的随机源
    pub fn with_rng(backend: B, config: &TranslationConfig, rng: SmallRng) -> Self {
        Self {
            backend,
            cache: TranslationCache::new(),
            rng: Mutex::new(rng),
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
            language_pool: config.language_pool.clone(),
            min_hops: config.min_hops,
            max_hops: config.max_hops,
            ignored_phrases: config.ignored_phrases.clone(),
            wrapped_phrases: config.wrapped_phrases.clone(),
            cache_ttl: config.cache_ttl(),
            cache_ttl_jitter: config.cache_ttl_jitter(),
            stats: ChainStats::default(),
        }
    }

    /// 翻译一段文本
    ///
    /// `hop_override` 替换中间语言数量的上限。这个方法不会失败：任何错误都记录日志并返回原文。
    pub async fn translate(&self, text: &str, hop_override: Option<usize>) -> String {
        if self.find_wrapped(text).is_none() {
            return self.translate_plain(text, hop_override).await;
        }

        let mut translated = String::with_capacity(text.len());
        for piece in self.split_placeholders(text) {
            match piece {
                Piece::Placeholder(phrase) => translated.push_str(phrase),
                Piece::Text(part) => {
                    translated.push_str(&self.translate_plain(part, hop_override).await)
                }
            }
        }
        translated
    }

    /// 不需要发给翻译服务的文本
    pub fn is_passthrough(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return true;
        }

        let mut chars = text.chars();
        let single_char = matches!(
            (chars.next(), chars.next(), chars.next()),
            (Some(_), None, _) | (Some(_), Some('\n'), None)
        );

        single_char
            || self.ignored_phrases.iter().any(|phrase| phrase == text)
            || text.eq_ignore_ascii_case("undefined")
    }

    /// 生成一条语言路径：源语言、打乱后截取的中间语言、目标语言
    pub fn hop_path(&self, hop_override: Option<usize>) -> Vec<String> {
        let mut rng = self.lock_rng();

        let upper = hop_override.unwrap_or(self.max_hops);
        let lower = self.min_hops.min(upper);
        let size = if lower < upper {
            rng.random_range(lower..upper)
        } else {
            upper
        }
        .min(self.language_pool.len());

        let mut intermediates = self.language_pool.clone();
        intermediates.shuffle(&mut *rng);
        intermediates.truncate(size);

        let mut path = Vec::with_capacity(size + 2);
        path.push(self.source_lang.clone());
        path.extend(intermediates);
        path.push(self.target_lang.clone());
        path
    }

    pub fn stats(&self) -> ChainStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn ignored_phrases(&self) -> &[String] {
        &self.ignored_phrases
    }

    pub fn wrapped_phrases(&self) -> &[String] {
        &self.wrapped_phrases
    }

    /// 不含包裹短语的文本
    async fn translate_plain(&self, text: &str, hop_override: Option<usize>) -> String {
        if self.is_passthrough(text) {
            self.stats.short_circuits.fetch_add(1, Ordering::Relaxed);
            return text.to_string();
        }

        if let Some(cached) = self.cache.get(text) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return cached;
        }

        self.run_hops(text, hop_override).await
    }

    async fn run_hops(&self, text: &str, hop_override: Option<usize>) -> String {
        let leading = &text[..text.len() - text.trim_start().len()];
        let trailing = &text[text.trim_end().len()..];
        let mut current = text.trim().to_string();

        let path = self.hop_path(hop_override);
        for hop in path.windows(2) {
            let (from, to) = (&hop[0], &hop[1]);
            self.stats.hop_requests.fetch_add(1, Ordering::Relaxed);

            match self.backend.translate(from, to, &current).await {
                Ok(next) => current = next,
                Err(e) => {
                    helpers::log_error(&e.with_context(format!("{from} → {to}")));
                    self.stats.failed_chains.fetch_add(1, Ordering::Relaxed);
                    return text.to_string();
                }
            }
        }

        let result = format!("{leading}{current}{trailing}");
        self.cache
            .insert(text.to_string(), result.clone(), self.cache_lifetime());
        self.stats.chains_completed.fetch_add(1, Ordering::Relaxed);

        result
    }

    /// 基础存活时间加上 `[0, 抖动)` 内的随机值
    fn cache_lifetime(&self) -> Duration {
        let factor: f64 = self.lock_rng().random();
        self.cache_ttl + self.cache_ttl_jitter.mul_f64(factor)
    }

    /// 最早出现的包裹短语；同一位置取最长的短语
    fn find_wrapped(&self, text: &str) -> Option<(usize, usize)> {
        self.wrapped_phrases
            .iter()
            .filter(|phrase| !phrase.is_empty())
            .filter_map(|phrase| text.find(phrase.as_str()).map(|pos| (pos, phrase.len())))
            .min_by_key(|&(pos, len)| (pos, Reverse(len)))
    }

    /// 迭代切分，不做递归
    fn split_placeholders<'t>(&self, mut text: &'t str) -> Vec<Piece<'t>> {
        let mut pieces = Vec::new();

        while let Some((pos, len)) = self.find_wrapped(text) {
            if pos > 0 {
                pieces.push(Piece::Text(&text[..pos]));
            }
            pieces.push(Piece::Placeholder(&text[pos..pos + len]));
            text = &text[pos + len..];
        }
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }

        pieces
    }

    fn lock_rng(&self) -> MutexGuard<'_, SmallRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }
}
