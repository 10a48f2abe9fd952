//! EZTR 输出构建器
//!
//! 负责把解析结果序列化为 `EZTR_Basic_ReplaceText(...)` 调用表达式，
//! 并把所有块的结果组装成最终的 C 源文件。

use crate::parsers::{parse_message, tokenize_content, FormatError, MessageHeader, TokenStream};

/// 跳过标记的前缀
pub const SKIP_MARKER_PREFIX: &str = "// Skipped #";

#[derive(Debug, Clone)]
pub struct EztrBuilderConfig {
    /// 输出文件包含的头文件
    pub include_header: String,
    /// 初始化函数名
    pub init_function: String,
    /// 替换调用的函数名
    pub replace_function: String,
    /// 每一级缩进的空格数
    pub indent_width: usize,
}

impl Default for EztrBuilderConfig {
    fn default() -> Self {
        Self {
            include_header: "eztr_api.h".to_string(),
            init_function: "replace_msgs".to_string(),
            replace_function: "EZTR_Basic_ReplaceText".to_string(),
            indent_width: 4,
        }
    }
}

/// 编译一个块的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledMessage {
    /// 完整的调用表达式
    Call(String),
    /// 正文没有任何记号
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct EztrBuilder {
    config: EztrBuilderConfig,
}

impl EztrBuilder {
    pub fn new(config: EztrBuilderConfig) -> Self {
        Self { config }
    }

    /// 解析并编译一个（可能已翻译的）块
    pub fn compile(&self, block: &str) -> Result<CompiledMessage, FormatError> {
        let parsed = parse_message(block)?;

        Ok(match tokenize_content(&parsed.content) {
            Some(stream) => CompiledMessage::Call(self.build_call(&parsed.header, &stream)),
            None => CompiledMessage::Empty,
        })
    }

    /// 序列化固定位置参数的调用
    pub fn build_call(&self, header: &MessageHeader, stream: &TokenStream) -> String {
        let indent = " ".repeat(self.config.indent_width);
        let rest_args = stream
            .args
            .iter()
            .map(|arg| format!(", {arg}"))
            .collect::<String>();

        let args = [
            header.message_id.clone(),
            header.text_box_type.clone(),
            header.text_box_y_pos.clone(),
            header.display_icon.clone(),
            header.next_message_id.to_string(),
            header.first_item_cost.to_string(),
            header.second_item_cost.to_string(),
            "false".to_string(),
            stream.content_expr(),
        ];

        let mut call = format!("{}(\n", self.config.replace_function);
        for arg in &args {
            call.push_str(&format!("{indent}{arg},\n"));
        }
        call.push_str(&format!("{indent}NULL{rest_args}\n);"));
        call
    }

    /// 组装最终的源文件
    ///
    /// 每个条目的每一行都缩进一级，条目顺序即传入顺序。
    pub fn render_file(&self, entries: &[String]) -> String {
        let indent = " ".repeat(self.config.indent_width);
        let body = entries
            .iter()
            .map(|entry| {
                entry
                    .split('\n')
                    .map(|line| format!("{indent}{line}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "#include \"{}\"\n\nEZTR_ON_INIT void {}() {{\n{}\n}}",
            self.config.include_header, self.config.init_function, body
        )
    }
}

/// 生成跳过标记，序号从 1 开始
pub fn skip_marker(index: usize) -> String {
    format!("{SKIP_MARKER_PREFIX}{}", index + 1)
}
