//! # 解析器模块
//!
//! 这个模块包含把 `DEFINE_MESSAGE` 宏源码编译为控制码流所需的全部解析功能：
//!
//! - 宏调用块的提取（括号平衡计数）
//! - 头部参数解析（尊重嵌套括号的逗号切分）
//! - 正文内容的记号化
//!
//! # 模块组织
//!
//! - `extractor` - 从原始文本中按顺序提取宏调用块
//! - `header` - 解析位置参数和嵌套的 `HEADER(...)` / `MSG(...)` 调用
//! - `content` - 将正文区域转换为有序的控制码记号流

pub mod content;
pub mod extractor;
pub mod header;

use thiserror::Error;

/// 宏调用的关键字
pub const INVOCATION_KEYWORD: &str = "DEFINE_MESSAGE";
/// 嵌套的头部关键字
pub const HEADER_KEYWORD: &str = "HEADER";
/// 嵌套的正文关键字
pub const CONTENT_KEYWORD: &str = "MSG";

/// 一个宏调用块
///
/// 提取后不可变；`index` 是它在源文本中的序号，从 0 开始且连续。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    pub index: usize,
    pub text: String,
}

impl MessageBlock {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// 宏结构格式错误
///
/// 只对单个块致命：调度器把它记录为跳过标记，不会中止整个批次。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// 找不到外层调用
    #[error("invalid DEFINE_MESSAGE format")]
    InvalidInvocation,

    /// 外层调用参数不足
    #[error("DEFINE_MESSAGE missing arguments: expected at least 4, found {found}")]
    MissingArguments { found: usize },

    /// 正文中没有头部调用
    #[error("missing HEADER")]
    MissingHeader,

    /// 头部调用参数不足
    #[error("HEADER() missing arguments: expected at least 6, found {found}")]
    HeaderArguments { found: usize },

    /// 正文中没有内容调用
    #[error("missing content body")]
    MissingContent,
}

// Re-export commonly used items for convenience
pub use content::{tokenize_content, ButtonGlyph, ParamCode, Token, TokenStream};
pub use extractor::extract_messages;
pub use header::{parse_message, split_top_level, HeaderValue, MessageHeader, ParsedMessage};
