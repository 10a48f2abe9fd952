//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "http://localhost:5000/translate";
    pub const DEFAULT_SOURCE_LANG: &str = "en";
    pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;

    // 跳数
    pub const DEFAULT_MIN_HOPS: usize = 7;
    pub const DEFAULT_MAX_HOPS: usize = 14;
    pub const FALLBACK_MAX_HOPS: usize = 5;

    // 单段译文长度上限（字符数）
    pub const MAX_SEGMENT_LENGTH: usize = 48;

    // 缓存设置：实际存活时间 = 基础时间 + [0, 抖动) 内的随机值
    pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);
    pub const DEFAULT_CACHE_TTL_JITTER: Duration = Duration::from_secs(90);
    // 基础时间和抖动各自的上限
    pub const MAX_CACHE_TTL: Duration = Duration::from_secs(86400);

    // 中间语言池
    pub const DEFAULT_LANGUAGE_POOL: &[&str] = &[
        "zh-Hant", "hi", "ca", "th", "bn", "de", "eo", "sq", "da", "gl", "ur", "ky", "ro",
        "pt-BR", "tl", "uk", "fi", "he",
    ];

    // 可忽略短语，剥离时按顺序取第一个匹配
    pub const IGNORED_PHRASES: &[&str] = &[
        "!", "?", ".", ",", "\n", " ", "(", ")", "\"", "'", "\n!", "!\n", ".\n", ", ", "...",
    ];

    // 输出文件
    pub const DEFAULT_CHECKPOINT_PATH: &str = "checkpoint_data.c";
    pub const DEFAULT_OUTPUT_PATH: &str = "poorly_translated.c";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "eztr-garble.toml",
        ".eztr-garble.toml",
        "~/.config/eztr-garble/config.toml",
    ];
}

/// 默认的包裹短语：所有按键图标短语
pub fn default_wrapped_phrases() -> Vec<String> {
    crate::parsers::ButtonGlyph::ALL
        .iter()
        .map(|glyph| glyph.phrase().to_string())
        .collect()
}
