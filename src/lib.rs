//! # EZTR Garble
//!
//! 把 `DEFINE_MESSAGE` 宏源码编译为 `EZTR_Basic_ReplaceText` 调用，
//! 编译前可以先让每条对话走一遍故意失真的多跳机器翻译。
//!
//! ## 模块组织
//!
//! - `core` - 单个块的处理流程和整次运行
//! - `parsers` - 宏调用块的提取、头部解析和正文记号化
//! - `builders` - 调用表达式和输出文件的构建器
//! - `translation` - 多跳翻译链、结果整理、检查点和调度
//! - `utils` - 字符白名单等工具函数
//! - `env` - 类型化的环境变量

pub mod builders;
pub mod core;
pub mod env;
pub mod parsers;
pub mod translation;
pub mod utils;

// Re-export commonly used items for convenience
pub use builders::{skip_marker, CompiledMessage, EztrBuilder};
pub use self::core::{compile_messages, GarbleError, MessagePipeline};
pub use parsers::{extract_messages, FormatError, MessageBlock};
pub use utils::sanitize_text;
