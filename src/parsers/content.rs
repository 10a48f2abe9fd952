//! 正文记号化
//!
//! 一次从左到右的扫描，按以下优先级识别记号：
//!
//! 1. 带参数的控制码 `SFX(...)`、`DELAY(...)`、`FADE(...)`，参数原样收集
//! 2. 带引号的字符串，内部的 `\n` 转义把它拆成两段并插入换行记号
//! 3. 大写标识符，成为带命名空间的控制码
//! 4. 引号外的 `\n` 转义，直接成为换行记号
//!
//! 字符串中的按键短语（如 `[A]`）会被拆出来，成为独立的按键图标记号。

use std::sync::LazyLock;

use regex::Regex;

/// 控制码命名空间前缀
pub const CONTROL_CODE_PREFIX: &str = "EZTR_CC_";

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(SFX|DELAY|FADE)\s*\(\s*([^)]+?)\s*\)|"((?:[^"\\]|\\.)*)"|(\b[A-Z_][A-Z0-9_]*\b)|(\\n)"#,
    )
    .expect("token pattern is valid")
});

/// 带一个参数的控制码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamCode {
    Sfx,
    Delay,
    Fade,
}

impl ParamCode {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "SFX" => Some(ParamCode::Sfx),
            "DELAY" => Some(ParamCode::Delay),
            "FADE" => Some(ParamCode::Fade),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParamCode::Sfx => "SFX",
            ParamCode::Delay => "DELAY",
            ParamCode::Fade => "FADE",
        }
    }

    /// “参数在此”占位控制码
    pub fn placeholder(&self) -> &'static str {
        match self {
            ParamCode::Sfx => "EZTR_CC_SFX_ARGW",
            ParamCode::Delay => "EZTR_CC_DELAY_ARGW",
            ParamCode::Fade => "EZTR_CC_FADE_ARGW",
        }
    }
}

/// 按键图标
///
/// 每个变体对应一个带方括号的短语，它们在文本中必须渲染为图标而不是普通字符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonGlyph {
    A,
    B,
    C,
    L,
    R,
    Z,
    CUp,
    CDown,
    CLeft,
    CRight,
    ControlPad,
}

impl ButtonGlyph {
    pub const ALL: [ButtonGlyph; 11] = [
        ButtonGlyph::A,
        ButtonGlyph::B,
        ButtonGlyph::C,
        ButtonGlyph::L,
        ButtonGlyph::R,
        ButtonGlyph::Z,
        ButtonGlyph::CUp,
        ButtonGlyph::CDown,
        ButtonGlyph::CLeft,
        ButtonGlyph::CRight,
        ButtonGlyph::ControlPad,
    ];

    /// 源文本中的短语
    pub fn phrase(&self) -> &'static str {
        match self {
            ButtonGlyph::A => "[A]",
            ButtonGlyph::B => "[B]",
            ButtonGlyph::C => "[C]",
            ButtonGlyph::L => "[L]",
            ButtonGlyph::R => "[R]",
            ButtonGlyph::Z => "[Z]",
            ButtonGlyph::CUp => "[C-Up]",
            ButtonGlyph::CDown => "[C-Down]",
            ButtonGlyph::CLeft => "[C-Left]",
            ButtonGlyph::CRight => "[C-Right]",
            ButtonGlyph::ControlPad => "[Control-Pad]",
        }
    }

    /// 不带前缀的控制码名
    pub fn code(&self) -> &'static str {
        match self {
            ButtonGlyph::A => "BTN_A",
            ButtonGlyph::B => "BTN_B",
            ButtonGlyph::C => "BTN_C",
            ButtonGlyph::L => "BTN_L",
            ButtonGlyph::R => "BTN_R",
            ButtonGlyph::Z => "BTN_Z",
            ButtonGlyph::CUp => "BTN_CUP",
            ButtonGlyph::CDown => "BTN_CDOWN",
            ButtonGlyph::CLeft => "BTN_CLEFT",
            ButtonGlyph::CRight => "BTN_CRIGHT",
            ButtonGlyph::ControlPad => "CONTROL_PAD",
        }
    }

    pub fn from_phrase(phrase: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|glyph| glyph.phrase() == phrase)
    }

    /// 在 `text` 中查找最早出现的按键短语，返回字节偏移和对应按键
    pub fn find_first(text: &str) -> Option<(usize, ButtonGlyph)> {
        Self::ALL
            .into_iter()
            .filter_map(|glyph| text.find(glyph.phrase()).map(|pos| (pos, glyph)))
            .min_by_key(|(pos, glyph)| (*pos, usize::MAX - glyph.phrase().len()))
    }
}

/// 记号
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// 字符串片段，保持源码中的转义形式，不含引号
    Literal(String),
    /// 无参数控制码，不含命名空间前缀
    ControlCode(String),
    /// 带参数控制码及其原始参数文本
    ControlCodeWithArg(ParamCode, String),
    Newline,
    Button(ButtonGlyph),
    End,
}

impl Token {
    /// 输出为调用参数中的表达式
    pub fn to_expr(&self) -> String {
        match self {
            Token::Literal(text) => format!("\"{text}\""),
            Token::ControlCode(name) => format!("{CONTROL_CODE_PREFIX}{name}"),
            Token::ControlCodeWithArg(code, _) => code.placeholder().to_string(),
            Token::Newline => format!("{CONTROL_CODE_PREFIX}NEWLINE"),
            Token::Button(glyph) => format!("{CONTROL_CODE_PREFIX}{}", glyph.code()),
            Token::End => format!("{CONTROL_CODE_PREFIX}END"),
        }
    }
}

/// 一个块的记号流
///
/// `tokens` 总是以 [`Token::End`] 结尾；`args` 按出现顺序保存带参数控制码的参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub args: Vec<String>,
}

impl TokenStream {
    /// 以空格连接的正文参数表达式
    pub fn content_expr(&self) -> String {
        self.tokens
            .iter()
            .map(Token::to_expr)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 记号化正文区域
///
/// 没有识别出任何记号时返回 `None`，调用方应把整个块当作无法表示而跳过。
pub fn tokenize_content(content: &str) -> Option<TokenStream> {
    let mut tokens = Vec::new();
    let mut args = Vec::new();

    for caps in TOKEN_RE.captures_iter(content) {
        if let (Some(name), Some(arg)) = (caps.get(1), caps.get(2)) {
            if let Some(code) = ParamCode::from_name(name.as_str()) {
                let arg = arg.as_str().trim().to_string();
                args.push(arg.clone());
                tokens.push(Token::ControlCodeWithArg(code, arg));
            }
        } else if let Some(literal) = caps.get(3) {
            push_literal(&mut tokens, literal.as_str());
        } else if let Some(ident) = caps.get(4) {
            tokens.push(Token::ControlCode(ident.as_str().to_string()));
        } else if caps.get(5).is_some() {
            tokens.push(Token::Newline);
        }
    }

    if tokens.is_empty() {
        return None;
    }

    tokens.push(Token::End);
    Some(TokenStream { tokens, args })
}

/// 拆分字符串内部的 `\n` 转义，空片段不输出
///
/// 按转义对扫描，`\\n` 是反斜杠加字母 n，不会被拆开。
fn push_literal(tokens: &mut Vec<Token>, raw: &str) {
    let bytes = raw.as_bytes();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'n') {
            push_text_with_buttons(tokens, &raw[start..i]);
            tokens.push(Token::Newline);
            start = i + 2;
        }
        i += 2;
    }

    push_text_with_buttons(tokens, &raw[start..]);
}

/// 关闭当前字符串、插入按键图标、再开启新字符串
fn push_text_with_buttons(tokens: &mut Vec<Token>, mut text: &str) {
    while let Some((pos, glyph)) = ButtonGlyph::find_first(text) {
        if pos > 0 {
            tokens.push(Token::Literal(text[..pos].to_string()));
        }
        tokens.push(Token::Button(glyph));
        text = &text[pos + glyph.phrase().len()..];
    }

    if !text.is_empty() {
        tokens.push(Token::Literal(text.to_string()));
    }
}
