use std::error::Error;
use std::fmt;
use std::fs;
use std::future::Future;
use std::path::Path;

use crate::builders::{skip_marker, CompiledMessage, EztrBuilder};
use crate::parsers::{extract_messages, MessageBlock};
use crate::translation::{
    extract_segments, reinsert, BlockProcessor, CheckpointRecord, CheckpointedScheduler,
    ResultReconciler, RunOutcome, TranslationBackend, TranslationChain, TranslationConfig,
    TranslationError,
};
use crate::utils::sanitize_text;

/// Represents errors that abort a whole run
///
/// Per-block problems never surface here; they become skip markers.
#[derive(Debug)]
pub struct GarbleError {
    details: String,
}

impl GarbleError {
    pub fn new(msg: &str) -> GarbleError {
        GarbleError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for GarbleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for GarbleError {}

impl From<TranslationError> for GarbleError {
    fn from(error: TranslationError) -> Self {
        GarbleError::new(&error.to_string())
    }
}

impl From<std::io::Error> for GarbleError {
    fn from(error: std::io::Error) -> Self {
        GarbleError::new(&error.to_string())
    }
}

/// 单个块的处理流程
///
/// 提取字面量 → 翻译 → 整理写回 → 字符过滤 → 编译。没有引号字面量的块、
/// 格式错误的块和正文为空的块都输出跳过标记。
pub struct MessagePipeline<B> {
    chain: TranslationChain<B>,
    builder: EztrBuilder,
    config: TranslationConfig,
}

impl<B: TranslationBackend> MessagePipeline<B> {
    /// `config.enabled` 为 `false` 时只编译，不会调用翻译服务
    pub fn new(backend: B, config: TranslationConfig) -> Self {
        Self {
            chain: TranslationChain::new(backend, &config),
            builder: EztrBuilder::default(),
            config,
        }
    }

    pub fn chain(&self) -> &TranslationChain<B> {
        &self.chain
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 处理一个块，返回编译好的调用或跳过标记
    pub async fn process_block(&self, block: &MessageBlock) -> String {
        let segments = extract_segments(&block.text, &self.config.ignored_phrases);
        if segments.is_empty() {
            tracing::info!("跳过 {}", block.index + 1);
            tracing::debug!("第 {} 条消息没有引号字面量", block.index + 1);
            return skip_marker(block.index);
        }

        let rebuilt = if self.config.enabled {
            let reconciler = ResultReconciler::new(&self.chain, &self.config);
            let parts = reconciler.translate_segments(block.index, &segments).await;
            reinsert(&block.text, &segments, &parts)
        } else {
            block.text.clone()
        };

        compile_block(&self.builder, block.index, &sanitize_text(&rebuilt))
    }

    /// 处理整个输入，直到完成或 `shutdown` 先完成
    ///
    /// 完成时写出结果文件并删除检查点；被中断时检查点已由调度器写好。
    pub async fn run<S>(&self, input: &str, resume: bool, shutdown: S) -> Result<RunOutcome, GarbleError>
    where
        S: Future<Output = ()>,
    {
        let blocks = extract_messages(input);
        let scheduler = CheckpointedScheduler::new(&self.config).with_resume(resume);

        let outcome = scheduler.run_with_shutdown(&blocks, self, shutdown).await?;

        if let RunOutcome::Completed(entries) = &outcome {
            let output_path = Path::new(&self.config.output_path);
            fs::write(output_path, self.builder.render_file(entries))?;
            CheckpointRecord::remove(scheduler.checkpoint_path())?;
            tracing::info!("全部完成，输出已写入 {}", output_path.display());
        }

        if self.config.enabled {
            let cache = self.chain.cache();
            let expired = cache.cleanup_expired();
            tracing::info!("{}", self.chain.stats());
            tracing::debug!(
                "缓存命中率 {:.1}%, 剩余 {} 条, 清理过期 {} 条",
                cache.get_stats().hit_rate() * 100.0,
                cache.size(),
                expired
            );
        }

        Ok(outcome)
    }
}

impl<B: TranslationBackend> BlockProcessor for MessagePipeline<B> {
    async fn process(&self, block: &MessageBlock) -> String {
        self.process_block(block).await
    }
}

/// 编译一个（可能已翻译的）块，失败时返回跳过标记
fn compile_block(builder: &EztrBuilder, index: usize, text: &str) -> String {
    match builder.compile(text) {
        Ok(CompiledMessage::Call(call)) => call,
        Ok(CompiledMessage::Empty) => {
            tracing::info!("跳过 {}", index + 1);
            tracing::debug!("第 {} 条消息正文没有可识别的记号:\n{}", index + 1, text);
            skip_marker(index)
        }
        Err(e) => {
            tracing::info!("跳过 {}", index + 1);
            tracing::debug!("第 {} 条消息格式错误 ({}):\n{}", index + 1, e, text);
            skip_marker(index)
        }
    }
}

/// 不经过翻译，直接把输入编译成完整的输出文件
///
/// ```rust
/// use eztr_garble::core::compile_messages;
///
/// let out = compile_messages(r#"DEFINE_MESSAGE(1, A, B, MSG(HEADER(0, X, 0xFFFF, 2, 3, Z) "Hi"))"#);
/// assert!(out.contains("EZTR_NO_VALUE"));
/// assert!(out.contains(r#""Hi" EZTR_CC_END"#));
/// ```
pub fn compile_messages(input: &str) -> String {
    let builder = EztrBuilder::default();
    let entries: Vec<String> = extract_messages(input)
        .iter()
        .map(|block| {
            if extract_segments(&block.text, &[]).is_empty() {
                return skip_marker(block.index);
            }
            compile_block(&builder, block.index, &sanitize_text(&block.text))
        })
        .collect();

    builder.render_file(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::TranslationResult;

    struct Unreachable;

    impl TranslationBackend for Unreachable {
        async fn translate(&self, _: &str, _: &str, _: &str) -> TranslationResult<String> {
            panic!("unexpected translation request");
        }
    }

    fn compile_only() -> MessagePipeline<Unreachable> {
        let config = TranslationConfig {
            enabled: false,
            ..TranslationConfig::default()
        };
        MessagePipeline::new(Unreachable, config)
    }

    #[tokio::test]
    async fn test_block_without_quotes_is_skipped() {
        let block = MessageBlock::new(4, "DEFINE_MESSAGE(1, A, B, MSG(HEADER(0, 1, 2, 3, 4, 5) BOX_BREAK))");
        assert_eq!(compile_only().process_block(&block).await, "// Skipped #5");
    }

    #[tokio::test]
    async fn test_empty_literal_is_skipped() {
        let text = r#"DEFINE_MESSAGE(1, A, B, MSG(HEADER(0, 1, 2, 3, 4, 5) ""))"#;
        let block = MessageBlock::new(0, text);

        assert_eq!(compile_only().process_block(&block).await, "// Skipped #1");

        // 空字面量不需要翻译，也不会发出请求
        let translating = MessagePipeline::new(Unreachable, TranslationConfig::default());
        assert_eq!(translating.process_block(&block).await, "// Skipped #1");

        assert!(compile_messages(text).contains("// Skipped #1"));
    }

    #[tokio::test]
    async fn test_malformed_block_is_skipped() {
        let block = MessageBlock::new(0, r#"DEFINE_MESSAGE(1, A, B, MSG("no header"))"#);
        assert_eq!(compile_only().process_block(&block).await, "// Skipped #1");
    }

    #[tokio::test]
    async fn test_disallowed_characters_are_replaced() {
        let block = MessageBlock::new(
            0,
            "DEFINE_MESSAGE(1, A, B, MSG(HEADER(0, 1, 2, 3, 4, 5) \"Caf\u{e9}\"))",
        );
        let out = compile_only().process_block(&block).await;
        assert!(out.contains("\"Caf \" EZTR_CC_END"), "{out}");
    }

    #[test]
    fn test_compile_messages_keeps_order() {
        let input = r#"
DEFINE_MESSAGE(1, A, B, MSG(HEADER(0, 1, 2, 3, 4, 5) "One"))
DEFINE_MESSAGE(2, A, B, MSG(HEADER(0, 1, 2, 3, 4, 5) BOX_BREAK))
DEFINE_MESSAGE(3, A, B, MSG(HEADER(0, 1, 2, 3, 4, 5) "Three"))
"#;
        let out = compile_messages(input);

        let one = out.find("\"One\"").unwrap();
        let skipped = out.find("// Skipped #2").unwrap();
        let three = out.find("\"Three\"").unwrap();
        assert!(one < skipped && skipped < three);
        assert!(out.starts_with("#include \"eztr_api.h\""));
        assert!(out.ends_with("\n}"));
    }
}
