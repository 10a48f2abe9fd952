//! 头部参数解析器
//!
//! 把一个 `DEFINE_MESSAGE(id, boxType, boxYPos, MSG(HEADER(...) ...))` 块拆成结构化的
//! [`MessageHeader`] 和原始正文区域。

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::{FormatError, CONTENT_KEYWORD, HEADER_KEYWORD, INVOCATION_KEYWORD};

/// 表示“未设置”的保留输入值
pub const NO_VALUE_SENTINEL: &str = "0xFFFF";
/// 未设置值在输出中的常量名
pub const NO_VALUE_CONSTANT: &str = "EZTR_NO_VALUE";

static INVOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s){INVOCATION_KEYWORD}\s*\((.*)\)\s*$"))
        .expect("invocation pattern is valid")
});

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{HEADER_KEYWORD}\s*\(([^)]+)\)")).expect("header pattern is valid")
});

static HEADER_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{HEADER_KEYWORD}\s*\([^)]*\)")).expect("header pattern is valid")
});

static CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)\b{CONTENT_KEYWORD}\s*\((.*)\)\s*$"))
        .expect("content pattern is valid")
});

/// 头部字段值
///
/// 只有 `nextMessageId`、`firstItemCost`、`secondItemCost` 三个字段使用这个类型，
/// 保留值 `0xFFFF` 被映射为 [`HeaderValue::NoValue`]。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    NoValue,
    Literal(String),
}

impl HeaderValue {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == NO_VALUE_SENTINEL {
            HeaderValue::NoValue
        } else {
            HeaderValue::Literal(raw.to_string())
        }
    }

    /// 输出用的表达式文本
    pub fn as_expr(&self) -> &str {
        match self {
            HeaderValue::NoValue => NO_VALUE_CONSTANT,
            HeaderValue::Literal(expr) => expr,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_expr())
    }
}

/// 结构化的消息头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub message_id: String,
    pub text_box_type: String,
    pub text_box_y_pos: String,
    pub display_icon: String,
    pub next_message_id: HeaderValue,
    pub first_item_cost: HeaderValue,
    pub second_item_cost: HeaderValue,
}

/// 一次解析的结果：头部加原始正文区域
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub header: MessageHeader,
    /// 去掉 `HEADER(...)` 之后的 `MSG(...)` 内部文本
    pub content: String,
}

/// 在顶层逗号处切分参数列表
///
/// 括号内部的逗号不参与切分，每个部分都会去掉首尾空白。
///
/// ```rust
/// use eztr_garble::parsers::split_top_level;
///
/// assert_eq!(split_top_level("a, f(b, c), d"), vec!["a", "f(b, c)", "d"]);
/// ```
pub fn split_top_level(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut level: i32 = 0;
    let mut start = 0;

    for (i, byte) in input.bytes().enumerate() {
        match byte {
            b'(' => level += 1,
            b')' => level -= 1,
            b',' if level == 0 => {
                parts.push(input[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim().to_string());

    parts
}

/// 解析一个宏调用块
pub fn parse_message(block: &str) -> Result<ParsedMessage, FormatError> {
    let args_text = INVOCATION_RE
        .captures(block)
        .and_then(|caps| caps.get(1))
        .ok_or(FormatError::InvalidInvocation)?
        .as_str();

    let args = split_top_level(args_text);
    if args.len() < 4 {
        return Err(FormatError::MissingArguments { found: args.len() });
    }

    // 第四个参数起都属于消息体，里面可能还有顶层逗号
    let body = args[3..].join(",");

    let header_text = HEADER_RE
        .captures(&body)
        .and_then(|caps| caps.get(1))
        .ok_or(FormatError::MissingHeader)?
        .as_str();
    let header_args = split_top_level(header_text);
    if header_args.len() < 6 {
        return Err(FormatError::HeaderArguments {
            found: header_args.len(),
        });
    }

    let content_raw = CONTENT_RE
        .captures(&body)
        .and_then(|caps| caps.get(1))
        .ok_or(FormatError::MissingContent)?
        .as_str();
    let content = HEADER_STRIP_RE.replace(content_raw, "").trim().to_string();

    let header = MessageHeader {
        message_id: args[0].clone(),
        text_box_type: args[1].clone(),
        text_box_y_pos: args[2].clone(),
        display_icon: header_args[1].clone(),
        next_message_id: HeaderValue::parse(&header_args[2]),
        first_item_cost: HeaderValue::parse(&header_args[3]),
        second_item_cost: HeaderValue::parse(&header_args[4]),
    };

    Ok(ParsedMessage { header, content })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"DEFINE_MESSAGE(0x0005, TEXTBOX_TYPE_0, TEXTBOX_POS_BOTTOM,
MSG(
HEADER(0x00, 0x03, 0xFFFF, 0xFFFF, 0x0014, 0xFFFF)
"Hello [A] friend"
)
)"#;

    #[test]
    fn test_split_top_level_ignores_nested_commas() {
        assert_eq!(
            split_top_level(" 1 , SFX(a, b) ,  MSG(HEADER(1, 2) \"x, y\") "),
            vec!["1", "SFX(a, b)", "MSG(HEADER(1, 2) \"x, y\")"]
        );
        assert_eq!(split_top_level(""), vec![""]);
    }

    #[test]
    fn test_parse_header_fields() {
        let parsed = parse_message(SAMPLE).expect("sample is well formed");
        let header = &parsed.header;

        assert_eq!(header.message_id, "0x0005");
        assert_eq!(header.text_box_type, "TEXTBOX_TYPE_0");
        assert_eq!(header.text_box_y_pos, "TEXTBOX_POS_BOTTOM");
        assert_eq!(header.display_icon, "0x03");
        assert_eq!(header.next_message_id, HeaderValue::NoValue);
        assert_eq!(header.first_item_cost, HeaderValue::NoValue);
        assert_eq!(header.second_item_cost.as_expr(), "0x0014");
    }

    #[test]
    fn test_parse_content_strips_header() {
        let parsed = parse_message(SAMPLE).expect("sample is well formed");
        assert_eq!(parsed.content, "\"Hello [A] friend\"");
    }

    #[test]
    fn test_sentinel_only_exact_match() {
        assert_eq!(HeaderValue::parse(" 0xFFFF "), HeaderValue::NoValue);
        assert_eq!(
            HeaderValue::parse("0xFFFE"),
            HeaderValue::Literal("0xFFFE".to_string())
        );
        assert_eq!(HeaderValue::NoValue.to_string(), NO_VALUE_CONSTANT);
    }

    #[test]
    fn test_sentinel_not_applied_to_other_fields() {
        let src = "DEFINE_MESSAGE(0xFFFF, 0xFFFF, 0xFFFF, MSG(HEADER(0xFFFF, 0xFFFF, 1, 2, 3, 4) \"x\"))";
        let header = parse_message(src).unwrap().header;

        assert_eq!(header.message_id, "0xFFFF");
        assert_eq!(header.text_box_type, "0xFFFF");
        assert_eq!(header.display_icon, "0xFFFF");
        assert_eq!(header.next_message_id.as_expr(), "1");
    }

    #[test]
    fn test_missing_header() {
        let src = "DEFINE_MESSAGE(1, 2, 3, MSG(\"no header\"))";
        assert_eq!(parse_message(src), Err(FormatError::MissingHeader));
        assert!(FormatError::MissingHeader.to_string().contains("missing HEADER"));
    }

    #[test]
    fn test_missing_content() {
        let src = "DEFINE_MESSAGE(1, 2, 3, HEADER(0, 0, 0, 0, 0, 0))";
        assert_eq!(parse_message(src), Err(FormatError::MissingContent));
        assert!(FormatError::MissingContent
            .to_string()
            .contains("missing content body"));
    }

    #[test]
    fn test_too_few_arguments() {
        assert_eq!(
            parse_message("DEFINE_MESSAGE(1, 2)"),
            Err(FormatError::MissingArguments { found: 2 })
        );
        assert_eq!(
            parse_message("DEFINE_MESSAGE(1, 2, 3, MSG(HEADER(0, 0, 0) \"x\"))"),
            Err(FormatError::HeaderArguments { found: 3 })
        );
        assert_eq!(parse_message("nothing here"), Err(FormatError::InvalidInvocation));
    }
}
