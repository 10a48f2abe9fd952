//! 翻译结果整理
//!
//! 一个块里的所有字面量先拼成一段一起翻译，再按分隔符拆回去。拆出来的段数不对时
//! 整批作废，改为逐段翻译。每段译文再做标点、大小写和长度修正，最后写回原位置。

use super::segments::{escape_literal, QuotedSegment};
use crate::translation::config::TranslationConfig;
use crate::translation::core::{TranslationBackend, TranslationChain};
use crate::translation::error::{TranslationError, TranslationResult};

/// 拼接各段时使用的分隔符
pub const JOIN_DELIMITER: &str = " \n ";
/// 拆分译文时使用的标记
pub const SPLIT_MARKER: char = '\n';

pub struct ResultReconciler<'c, B> {
    chain: &'c TranslationChain<B>,
    max_segment_length: usize,
    fallback_max_hops: usize,
}

impl<'c, B: TranslationBackend> ResultReconciler<'c, B> {
    pub fn new(chain: &'c TranslationChain<B>, config: &TranslationConfig) -> Self {
        Self {
            chain,
            max_segment_length: config.max_segment_length,
            fallback_max_hops: config.fallback_max_hops,
        }
    }

    /// 翻译一个块的所有字面量，返回已恢复首尾短语、尚未转义的文本
    ///
    /// `ordinal` 只用于日志。
    pub async fn translate_segments(&self, ordinal: usize, segments: &[QuotedSegment]) -> Vec<String> {
        match self.translate_batched(segments).await {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!("第 {} 条消息{}，改为逐段翻译", ordinal + 1, e);
                self.translate_each(segments).await
            }
        }
    }

    /// 拼接后一次性翻译
    pub async fn translate_batched(&self, segments: &[QuotedSegment]) -> TranslationResult<Vec<String>> {
        let joined = segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(JOIN_DELIMITER);

        let translated = self.chain.translate(&joined, None).await;
        let parts = split_joined(&translated);

        if parts.len() != segments.len() {
            return Err(TranslationError::SegmentCountMismatch {
                expected: segments.len(),
                actual: parts.len(),
            });
        }

        Ok(segments
            .iter()
            .zip(parts)
            .map(|(segment, part)| self.finish(segment, &part))
            .collect())
    }

    /// 逐段翻译，使用较短的语言路径
    pub async fn translate_each(&self, segments: &[QuotedSegment]) -> Vec<String> {
        let mut parts = Vec::with_capacity(segments.len());

        for segment in segments {
            if self.is_ignorable(segment) {
                parts.push(segment.restore(&segment.text));
                continue;
            }
            let translated = self
                .chain
                .translate(&segment.text, Some(self.fallback_max_hops))
                .await;
            parts.push(self.finish(segment, &translated));
        }

        parts
    }

    /// 修正单段译文并恢复首尾短语
    fn finish(&self, segment: &QuotedSegment, translated: &str) -> String {
        if self.is_ignorable(segment) {
            return segment.restore(&segment.text);
        }

        let fixed = fix_punctuation(&segment.text, translated, self.chain.ignored_phrases());
        let fixed = fix_casing(&segment.text, &fixed);
        segment.restore(truncate_chars(&fixed, self.max_segment_length))
    }

    fn is_ignorable(&self, segment: &QuotedSegment) -> bool {
        segment.is_ignorable(self.chain.ignored_phrases(), self.chain.wrapped_phrases())
    }
}

/// 按标记拆分，并去掉每个拆分点两侧各一个拼接空格
pub fn split_joined(translated: &str) -> Vec<String> {
    let pieces: Vec<&str> = translated.split(SPLIT_MARKER).collect();
    let last = pieces.len() - 1;

    pieces
        .iter()
        .enumerate()
        .map(|(i, piece)| {
            let mut part = *piece;
            if i > 0 {
                part = part.strip_prefix(' ').unwrap_or(part);
            }
            if i < last {
                part = part.strip_suffix(' ').unwrap_or(part);
            }
            part.to_string()
        })
        .collect()
}

/// 原文不以可忽略字符结尾、译文却以它结尾时，去掉译文最后一个字符
///
/// 结果总是去掉了结尾空白。
pub fn fix_punctuation(original: &str, translated: &str, ignored: &[String]) -> String {
    let is_ignored = |c: Option<char>| {
        c.is_some_and(|c| {
            ignored
                .iter()
                .any(|phrase| phrase.chars().eq(std::iter::once(c)))
        })
    };

    let translated = translated.trim_end();
    let original_last = original.trim_end().chars().last();
    let translated_last = translated.chars().last();

    match translated_last {
        Some(last) if !is_ignored(original_last) && is_ignored(translated_last) => {
            translated[..translated.len() - last.len_utf8()].to_string()
        }
        _ => translated.to_string(),
    }
}

/// 译文首字母的大小写跟随原文；全大写的译文保持不变
pub fn fix_casing(original: &str, translated: &str) -> String {
    let (Some(original_first), Some(first)) = (original.chars().next(), translated.chars().next())
    else {
        return translated.to_string();
    };

    if translated.to_uppercase() == translated {
        return translated.to_string();
    }

    let rest = &translated[first.len_utf8()..];
    if original_first.is_uppercase() {
        first.to_uppercase().chain(rest.chars()).collect()
    } else {
        first.to_lowercase().chain(rest.chars()).collect()
    }
}

/// 按字符数截断
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 按字节范围把译文写回块中
///
/// 每段都会重新转义换行和引号。`parts` 与 `segments` 一一对应。
pub fn reinsert(block: &str, segments: &[QuotedSegment], parts: &[String]) -> String {
    let mut rebuilt = String::with_capacity(block.len());
    let mut cursor = 0;

    for (segment, part) in segments.iter().zip(parts) {
        rebuilt.push_str(&block[cursor..segment.span.start]);
        rebuilt.push('"');
        rebuilt.push_str(&escape_literal(part));
        rebuilt.push('"');
        cursor = segment.span.end;
    }
    rebuilt.push_str(&block[cursor..]);

    rebuilt
}
