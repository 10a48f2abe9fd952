//! 字符白名单过滤
//!
//! 目标渲染器只认识有限的字符集。编译前，块文本中不在白名单里的字符会被替换为空格，
//! 每次替换记录一条警告，从不视为致命错误。

/// 替换不允许字符所用的字符
pub const REPLACEMENT_CHAR: char = ' ';

const ALLOWED_PUNCTUATION: &[char] = &[
    ' ', '.', ',', '!', '?', '\'', '"', ':', ';', '-', '_', '+', '=', '/', '\\', '(', ')', '[',
    ']', '{', '}', '\n', '\r', '\t', '*',
];

/// 检查字符是否在白名单中
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(&c)
}

/// 过滤文本，返回替换后的结果
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            if is_allowed_char(c) {
                c
            } else {
                tracing::warn!("不允许的字符 '{}' (U+{:04X})，已替换为空格", c, c as u32);
                REPLACEMENT_CHAR
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_text_unchanged() {
        let text = "DEFINE_MESSAGE(0x1, A, B, MSG(\"Hello, world! [A] {x} *y*\\n\"))";
        assert_eq!(sanitize_text(text), text);
    }

    #[test]
    fn test_disallowed_chars_replaced() {
        assert_eq!(sanitize_text("Grüße — ok"), "Gr  e   ok");
        assert_eq!(sanitize_text("日本"), "  ");
        assert_eq!(sanitize_text("a#b$c%"), "a b c ");
    }

    #[test]
    fn test_is_allowed_char() {
        assert!(is_allowed_char('Z'));
        assert!(is_allowed_char('7'));
        assert!(is_allowed_char('\t'));
        assert!(!is_allowed_char('é'));
        assert!(!is_allowed_char('<'));
    }
}
