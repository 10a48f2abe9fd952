//! 宏调用块提取器
//!
//! 从原始文本中扫描 `DEFINE_MESSAGE(` 出现的位置，从第一个 `(` 开始做括号深度计数，
//! 深度回到 0 时块结束。块按源文本顺序返回，互不重叠。
//!
//! 输入末尾如果存在未闭合的调用，该调用被丢弃并记录一条警告。

use super::{MessageBlock, INVOCATION_KEYWORD};

/// 提取全部宏调用块
///
/// # 示例
///
/// ```rust
/// use eztr_garble::parsers::extract_messages;
///
/// let src = r#"DEFINE_MESSAGE(0x1, 0, 0, MSG(HEADER(0,0,0,0,0,0) "a"))
/// DEFINE_MESSAGE(0x2, 0, 0, MSG(HEADER(0,0,0,0,0,0) "b"))"#;
/// let blocks = extract_messages(src);
/// assert_eq!(blocks.len(), 2);
/// assert_eq!(blocks[1].index, 1);
/// ```
pub fn extract_messages(input: &str) -> Vec<MessageBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = input[cursor..].find(INVOCATION_KEYWORD) {
        let start = cursor + offset;

        match find_block_end(input, start) {
            Some(end) => {
                blocks.push(MessageBlock::new(blocks.len(), &input[start..end]));
                cursor = end;
            }
            None => {
                tracing::warn!(
                    "第 {} 个 {} 调用在输入末尾未闭合，已丢弃",
                    blocks.len() + 1,
                    INVOCATION_KEYWORD
                );
                break;
            }
        }
    }

    blocks
}

/// 返回块结束位置（右括号之后的字节偏移），括号不平衡时返回 `None`
fn find_block_end(input: &str, start: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut started = false;

    for (offset, byte) in input.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'(' => {
                depth += 1;
                started = true;
            }
            b')' if started => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }

    None
}
