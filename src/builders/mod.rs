//! # 构建器模块
//!
//! 这个模块包含用于构建输出产物的构建器：
//!
//! - 替换调用表达式的序列化
//! - 最终 C 源文件的组装
//!
//! # 模块组织
//!
//! - `eztr_builder` - `EZTR_Basic_ReplaceText` 调用与 `replace_msgs` 初始化函数的构建

pub mod eztr_builder;

// Re-export commonly used items for convenience
pub use eztr_builder::{
    skip_marker, CompiledMessage, EztrBuilder, EztrBuilderConfig, SKIP_MARKER_PREFIX,
};
