//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量管理。所有变量都以 `EZTR_GARBLE_` 为前缀。

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
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 只在变量被显式设置时返回值，不回落到默认值
    fn get_if_set() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "EZTR_GARBLE_LOG_LEVEL";
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
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// 翻译功能启用状态
    pub struct Enabled;
    impl EnvVar<bool> for Enabled {
        const NAME: &'static str = "EZTR_GARBLE_ENABLED";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Route dialogue text through the translation chain";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "EZTR_GARBLE_API_URL";
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

    /// 源语言（同时也是最后一跳的目标语言的默认值）
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "EZTR_GARBLE_SOURCE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Language the dialogue is written in";

        fn parse(value: &str) -> EnvResult<String> {
            parse_lang(value, Self::NAME)
        }
    }

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "EZTR_GARBLE_TARGET_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Language of the last hop";

        fn parse(value: &str) -> EnvResult<String> {
            parse_lang(value, Self::NAME)
        }
    }

    /// 最大并发数
    pub struct MaxConcurrent;
    impl EnvVar<usize> for MaxConcurrent {
        const NAME: &'static str = "EZTR_GARBLE_MAX_CONCURRENT";
        const DEFAULT: Option<usize> = Some(10);
        const DESCRIPTION: &'static str = "Number of blocks processed concurrently";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100)
        }
    }

    /// 最少跳数
    pub struct MinHops;
    impl EnvVar<usize> for MinHops {
        const NAME: &'static str = "EZTR_GARBLE_MIN_HOPS";
        const DEFAULT: Option<usize> = Some(7);
        const DESCRIPTION: &'static str = "Lower bound of intermediate languages per chain";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 0, 64)
        }
    }

    /// 最多跳数
    pub struct MaxHops;
    impl EnvVar<usize> for MaxHops {
        const NAME: &'static str = "EZTR_GARBLE_MAX_HOPS";
        const DEFAULT: Option<usize> = Some(14);
        const DESCRIPTION: &'static str = "Upper bound (exclusive) of intermediate languages per chain";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 0, 64)
        }
    }

    /// 随机种子
    pub struct Seed;
    impl EnvVar<u64> for Seed {
        const NAME: &'static str = "EZTR_GARBLE_SEED";
        const DEFAULT: Option<u64> = None;
        const DESCRIPTION: &'static str = "Seed for hop path selection (unset: random)";

        fn parse(value: &str) -> EnvResult<u64> {
            value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid unsigned integer".to_string(),
            })
        }
    }
}

/// 缓存相关环境变量
pub mod cache {
    use super::*;
    use crate::translation::config::constants::MAX_CACHE_TTL;

    /// 缓存基础存活时间
    pub struct Ttl;
    impl EnvVar<Duration> for Ttl {
        const NAME: &'static str = "EZTR_GARBLE_CACHE_TTL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Base lifetime of cached translations in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number of seconds".to_string(),
            })?;

            let ttl = Duration::from_secs(seconds);
            if ttl > MAX_CACHE_TTL {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("TTL too long (max {} seconds)", MAX_CACHE_TTL.as_secs()),
                });
            }

            Ok(ttl)
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

/// 语言代码：字母开头，只含字母和连字符（如 `pt-BR`、`zh-Hant`）
fn parse_lang(value: &str, var_name: &str) -> EnvResult<String> {
    let lang = value.trim();
    let valid = lang.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && lang.chars().all(|c| c.is_ascii_alphabetic() || c == '-');

    if valid {
        Ok(lang.to_string())
    } else {
        Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid language code '{}'", value),
        })
    }
}

fn doc_line<T: fmt::Debug, V: EnvVar<T>>() -> String {
    format!("- `{}`: {} (default: {:?})\n", V::NAME, V::DESCRIPTION, V::DEFAULT)
}

/// 生成环境变量文档
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&doc_line::<String, core::LogLevel>());

    docs.push_str("\n## Translation Configuration\n\n");
    docs.push_str(&doc_line::<bool, translation::Enabled>());
    docs.push_str(&doc_line::<String, translation::ApiUrl>());
    docs.push_str(&doc_line::<String, translation::SourceLang>());
    docs.push_str(&doc_line::<String, translation::TargetLang>());
    docs.push_str(&doc_line::<usize, translation::MaxConcurrent>());
    docs.push_str(&doc_line::<usize, translation::MinHops>());
    docs.push_str(&doc_line::<usize, translation::MaxHops>());
    docs.push_str(&doc_line::<u64, translation::Seed>());

    docs.push_str("\n## Cache Configuration\n\n");
    docs.push_str(&doc_line::<Duration, cache::Ttl>());

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert!(core::LogLevel::parse("verbose").is_err());
    }

    #[test]
    fn test_boolean_parsing() {
        assert!(translation::Enabled::parse("true").unwrap());
        assert!(translation::Enabled::parse("1").unwrap());
        assert!(translation::Enabled::parse("YES").unwrap());

        assert!(!translation::Enabled::parse("false").unwrap());
        assert!(!translation::Enabled::parse("off").unwrap());

        assert!(translation::Enabled::parse("maybe").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(translation::ApiUrl::parse("http://localhost:5000/translate").is_ok());
        assert!(translation::ApiUrl::parse("https://api.example.com").is_ok());

        assert!(translation::ApiUrl::parse("ftp://example.com").is_err());
        assert!(translation::ApiUrl::parse("not-a-url").is_err());
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(translation::SourceLang::parse(" pt-BR ").unwrap(), "pt-BR");
        assert_eq!(translation::TargetLang::parse("zh-Hant").unwrap(), "zh-Hant");
        assert!(translation::SourceLang::parse("").is_err());
        assert!(translation::SourceLang::parse("e n").is_err());
        assert!(translation::SourceLang::parse("-en").is_err());
    }

    #[test]
    fn test_numeric_validation() {
        assert_eq!(translation::MaxConcurrent::parse("4").unwrap(), 4);
        assert!(translation::MaxConcurrent::parse("0").is_err());
        assert!(translation::MaxConcurrent::parse("101").is_err());
        assert_eq!(translation::Seed::parse("42").unwrap(), 42);
        assert!(translation::Seed::parse("-1").is_err());
        assert_eq!(cache::Ttl::parse("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_get_if_set_ignores_unset_variable() {
        // 这个变量在任何测试里都不会被设置
        assert!(matches!(translation::Seed::get_if_set(), Ok(None)));
        assert!(translation::Seed::get().is_err());
    }

    #[test]
    fn test_generate_env_docs() {
        let docs = generate_env_docs();
        assert!(docs.contains("EZTR_GARBLE_API_URL"));
        assert!(docs.contains("EZTR_GARBLE_MAX_CONCURRENT"));
        assert!(docs.contains("## Cache Configuration"));
    }
}
