//! # 工具模块
//!
//! 这个模块包含各种工具函数和实用程序：
//!
//! - 目标渲染器字符集的白名单过滤
//!
//! # 模块组织
//!
//! - `charset` - 字符白名单检查与替换

pub mod charset;

// Re-export commonly used items for convenience
pub use charset::{is_allowed_char, sanitize_text, REPLACEMENT_CHAR};
