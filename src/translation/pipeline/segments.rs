//! 引号字面量切分
//!
//! 从一个块中取出所有带引号的字符串，解码转义，剥离首尾的可忽略短语并记录下来，
//! 以便翻译之后原样恢复并写回原来的位置。

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// 带引号的字符串，允许内部出现 `\"`
pub static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("quoted pattern is valid"));

/// 一个引号字面量
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedSegment {
    /// 解码并剥离首尾短语之后的文本
    pub text: String,
    /// 被剥离的开头短语，可能为空
    pub start_phrase: String,
    /// 被剥离的结尾短语，可能为空
    pub end_phrase: String,
    /// 整个字面量（含引号）在块中的字节范围
    pub span: Range<usize>,
}

impl QuotedSegment {
    /// 不需要翻译的文本：去掉空白后为空、是可忽略短语或是包裹短语
    pub fn is_ignorable(&self, ignored: &[String], wrapped: &[String]) -> bool {
        let trimmed = self.text.trim();
        trimmed.is_empty()
            || ignored.iter().any(|phrase| phrase == trimmed)
            || wrapped.iter().any(|phrase| phrase == trimmed)
    }

    /// 把剥离的短语加回到 `core` 两侧
    pub fn restore(&self, core: &str) -> String {
        format!("{}{}{}", self.start_phrase, core, self.end_phrase)
    }
}

/// 取出块中所有引号字面量，按出现顺序
pub fn extract_segments(block: &str, ignored: &[String]) -> Vec<QuotedSegment> {
    QUOTED_RE
        .captures_iter(block)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?;
            let decoded = decode_literal(inner.as_str());
            let (start_phrase, core, end_phrase) = strip_phrases(&decoded, ignored);

            Some(QuotedSegment {
                text: core.to_string(),
                start_phrase: start_phrase.to_string(),
                end_phrase: end_phrase.to_string(),
                span: whole.range(),
            })
        })
        .collect()
}

/// 剥离最多一个开头短语和一个结尾短语
///
/// 短语按列表顺序匹配，第一个匹配的生效。
pub fn strip_phrases<'t>(text: &'t str, ignored: &[String]) -> (&'t str, &'t str, &'t str) {
    let start_len = ignored
        .iter()
        .find(|phrase| !phrase.is_empty() && text.starts_with(phrase.as_str()))
        .map_or(0, |phrase| phrase.len());
    let (start, rest) = text.split_at(start_len);

    let end_len = ignored
        .iter()
        .find(|phrase| !phrase.is_empty() && rest.ends_with(phrase.as_str()))
        .map_or(0, |phrase| phrase.len());
    let (core, end) = rest.split_at(rest.len() - end_len);

    (start, core, end)
}

/// 解码 `\\`、`\n`、`\t`、`\"` 和 `\'`
///
/// 其他转义按字面的反斜杠处理，重新转义后成为 `\\x`。
pub fn decode_literal(raw: &str) -> String {
    let mut decoded = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => decoded.push('\\'),
            Some('n') => decoded.push('\n'),
            Some('t') => decoded.push('\t'),
            Some('"') => decoded.push('"'),
            Some('\'') => decoded.push('\''),
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            }
            None => decoded.push('\\'),
        }
    }

    decoded
}

/// 转义成可以放回引号里的文本
///
/// 每个反斜杠都会加倍，所以截断或译文带来的落单反斜杠不会吃掉结束引号。
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '"' => escaped.push_str("\\\""),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::config::constants::IGNORED_PHRASES;

    fn ignored() -> Vec<String> {
        IGNORED_PHRASES.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_extract_respects_escaped_quotes() {
        let block = r#"MSG(HEADER(0) "Say \"hi\" now" COLOR_RED "Bye")"#;
        let segments = extract_segments(block, &[]);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, r#"Say "hi" now"#);
        assert_eq!(&block[segments[0].span.clone()], r#""Say \"hi\" now""#);
        assert_eq!(segments[1].text, "Bye");
    }

    #[test]
    fn test_strip_records_phrases() {
        let segments = extract_segments(r#""Hello there!\n" "(whisper)""#, &ignored());

        assert_eq!(segments[0].start_phrase, "");
        assert_eq!(segments[0].text, "Hello there!");
        assert_eq!(segments[0].end_phrase, "\n");
        assert_eq!(segments[0].restore("X"), "X\n");

        assert_eq!(segments[1].start_phrase, "(");
        assert_eq!(segments[1].text, "whisper");
        assert_eq!(segments[1].end_phrase, ")");
    }

    #[test]
    fn test_strip_uses_list_order() {
        // "." 排在 "..." 之前，所以只剥离一个点
        let (start, core, end) = strip_phrases("Well...", &ignored());
        assert_eq!((start, core, end), ("", "Well..", "."));

        let (start, core, end) = strip_phrases("!", &ignored());
        assert_eq!((start, core, end), ("!", "", ""));
    }

    #[test]
    fn test_ignorable_segments() {
        let wrapped = vec!["[A]".to_string()];
        let ignorable = |text: &str| QuotedSegment {
            text: text.to_string(),
            start_phrase: String::new(),
            end_phrase: String::new(),
            span: 0..0,
        }
        .is_ignorable(&ignored(), &wrapped);

        assert!(ignorable(""));
        assert!(ignorable("  "));
        assert!(ignorable(" [A] "));
        assert!(ignorable("..."));
        assert!(!ignorable("Hello"));
    }

    #[test]
    fn test_decode_and_escape() {
        assert_eq!(
            decode_literal(r#"a\nb \"c\" \\ \t \' \q"#),
            "a\nb \"c\" \\ \t ' \\q"
        );
        assert_eq!(escape_literal("a\nb \"c\""), r#"a\nb \"c\""#);
        assert_eq!(escape_literal("dangling\\"), r#"dangling\\"#);

        let raw = r#"Line\n\"Quote\" C:\\dir\tend"#;
        assert_eq!(escape_literal(&decode_literal(raw)), raw);
    }
}
