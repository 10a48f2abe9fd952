//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{constants, default_wrapped_phrases};
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 基础配置
    pub enabled: bool,
    pub source_lang: String,
    pub target_lang: String,
    pub api_url: String,

    // 跳数配置
    pub language_pool: Vec<String>,
    pub min_hops: usize,
    pub max_hops: usize,
    pub fallback_max_hops: usize,

    // 性能配置
    pub max_concurrent_requests: usize,
    pub max_segment_length: usize,

    // 缓存配置
    pub cache_ttl_secs: u64,
    pub cache_ttl_jitter_secs: u64,

    /// 固定种子，用于复现同一条语言路径
    pub seed: Option<u64>,

    // 短语表
    pub ignored_phrases: Vec<String>,
    pub wrapped_phrases: Vec<String>,

    // 输出
    pub checkpoint_path: String,
    pub output_path: String,
    pub progress_interval: usize,
    pub preview_interval: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            target_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            api_url: constants::DEFAULT_API_URL.to_string(),

            language_pool: constants::DEFAULT_LANGUAGE_POOL
                .iter()
                .map(|lang| lang.to_string())
                .collect(),
            min_hops: constants::DEFAULT_MIN_HOPS,
            max_hops: constants::DEFAULT_MAX_HOPS,
            fallback_max_hops: constants::FALLBACK_MAX_HOPS,

            max_concurrent_requests: constants::DEFAULT_MAX_CONCURRENT_REQUESTS,
            max_segment_length: constants::MAX_SEGMENT_LENGTH,

            cache_ttl_secs: constants::DEFAULT_CACHE_TTL.as_secs(),
            cache_ttl_jitter_secs: constants::DEFAULT_CACHE_TTL_JITTER.as_secs(),

            seed: None,

            ignored_phrases: constants::IGNORED_PHRASES
                .iter()
                .map(|phrase| phrase.to_string())
                .collect(),
            wrapped_phrases: default_wrapped_phrases(),

            checkpoint_path: constants::DEFAULT_CHECKPOINT_PATH.to_string(),
            output_path: constants::DEFAULT_OUTPUT_PATH.to_string(),
            progress_interval: 1,
            preview_interval: 3,
        }
    }
}

impl TranslationConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.max_concurrent_requests == 0 {
            return Err(TranslationError::ConfigError("最大并发数不能为0".to_string()));
        }

        if self.min_hops > self.max_hops {
            return Err(TranslationError::ConfigError(format!(
                "最少跳数 {} 大于最多跳数 {}",
                self.min_hops, self.max_hops
            )));
        }

        if self.max_segment_length == 0 {
            return Err(TranslationError::ConfigError("单段长度上限不能为0".to_string()));
        }

        if self.enabled && self.language_pool.is_empty() {
            return Err(TranslationError::ConfigError(
                "启用翻译时中间语言池不能为空".to_string(),
            ));
        }

        let max_ttl = constants::MAX_CACHE_TTL.as_secs();
        if self.cache_ttl_secs > max_ttl || self.cache_ttl_jitter_secs > max_ttl {
            return Err(TranslationError::ConfigError(format!(
                "缓存存活时间和抖动都不能超过 {} 秒",
                max_ttl
            )));
        }

        if self.source_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("源语言不能为空".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    ///
    /// 只有显式设置的变量会生效；无效值记录警告后忽略。
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{cache, translation, EnvError, EnvVar};

        fn apply<T>(result: Result<Option<T>, EnvError>, target: &mut T) {
            match result {
                Ok(Some(value)) => *target = value,
                Ok(None) => {}
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        apply(translation::Enabled::get_if_set(), &mut self.enabled);
        apply(translation::SourceLang::get_if_set(), &mut self.source_lang);
        apply(translation::TargetLang::get_if_set(), &mut self.target_lang);
        apply(
            translation::MaxConcurrent::get_if_set(),
            &mut self.max_concurrent_requests,
        );
        apply(translation::MinHops::get_if_set(), &mut self.min_hops);
        apply(translation::MaxHops::get_if_set(), &mut self.max_hops);

        match translation::ApiUrl::get_if_set() {
            Ok(Some(api_url)) => {
                self.api_url = api_url;
                tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
        }

        match translation::Seed::get_if_set() {
            Ok(Some(seed)) => self.seed = Some(seed),
            Ok(None) => {}
            Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
        }

        match cache::Ttl::get_if_set() {
            Ok(Some(ttl)) => self.cache_ttl_secs = ttl.as_secs(),
            Ok(None) => {}
            Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_ttl_jitter(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_jitter_secs)
    }
}

/// 配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    ///
    /// 顺序：`.env` 文件、第一个存在的配置文件、环境变量覆盖、验证。
    pub fn new() -> TranslationResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件创建，仍然应用环境变量覆盖
    pub fn from_path(path: &str) -> TranslationResult<Self> {
        Self::load_dotenv();

        let expanded_path = shellexpand::tilde(path);
        let mut config = Self::load_from_file(&expanded_path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 从搜索路径加载配置
    fn load_config() -> TranslationResult<TranslationConfig> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(TranslationConfig::default())
    }

    /// 从指定文件加载配置
    ///
    /// `.toml` 结尾的文件按 TOML 解析，其余按 JSON 解析。
    fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::from(e).with_context(path))?;

        let config: TranslationConfig = if path.ends_with(".toml") {
            toml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Ok(config)
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let content = toml::to_string_pretty(&TranslationConfig::default())?;
        std::fs::write(path, content).map_err(|e| TranslationError::from(e).with_context(path))
    }
}
