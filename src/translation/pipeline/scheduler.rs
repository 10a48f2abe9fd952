//! 带检查点的调度器
//!
//! 固定数量的工作单元共享一个游标，依次领取下一个未处理的序号，把结果写进该序号的槽位。
//! 完成顺序不确定，但输出总是按原始顺序排列。
//!
//! 所有工作单元在同一个任务里由 `join_all` 驱动，不需要 `Send`。中断信号到达时，
//! 正在进行的请求被直接丢弃，只保存连续完成的前缀。

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use futures::future::join_all;

use super::checkpoint::CheckpointRecord;
use crate::parsers::MessageBlock;
use crate::translation::config::TranslationConfig;
use crate::translation::error::{helpers, TranslationResult};

/// 单个块的处理逻辑
///
/// 返回值是该块的最终输出：编译好的调用或跳过标记。处理本身不会失败。
#[allow(async_fn_in_trait)]
pub trait BlockProcessor {
    async fn process(&self, block: &MessageBlock) -> String;
}

impl<P: BlockProcessor + ?Sized> BlockProcessor for &P {
    async fn process(&self, block: &MessageBlock) -> String {
        (**self).process(block).await
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 所有块都已处理，按原始顺序排列
    Completed(Vec<String>),
    /// 被中断，检查点已写入
    Interrupted { watermark: usize },
}

#[derive(Debug, Clone)]
pub struct CheckpointedScheduler {
    concurrency: usize,
    checkpoint_path: PathBuf,
    progress_interval: usize,
    preview_interval: usize,
    resume: bool,
}

impl CheckpointedScheduler {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            concurrency: config.max_concurrent_requests.max(1),
            checkpoint_path: PathBuf::from(&config.checkpoint_path),
            progress_interval: config.progress_interval,
            preview_interval: config.preview_interval,
            resume: true,
        }
    }

    pub fn with_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = path.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// 为 `false` 时忽略已有的检查点
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint_path
    }

    /// 读取检查点；文件损坏或与输入不符时从头开始
    pub fn load_checkpoint(&self, total: usize) -> CheckpointRecord {
        if !self.resume {
            return CheckpointRecord::default();
        }

        match CheckpointRecord::load(&self.checkpoint_path) {
            Ok(Some(record)) if record.watermark <= total => {
                tracing::info!(
                    "从检查点 {} 恢复，水位 {}",
                    self.checkpoint_path.display(),
                    record.watermark
                );
                record
            }
            Ok(Some(record)) => {
                tracing::warn!(
                    "检查点水位 {} 超过消息总数 {}，从头开始",
                    record.watermark,
                    total
                );
                CheckpointRecord::default()
            }
            Ok(None) => CheckpointRecord::default(),
            Err(e) => {
                helpers::log_error(&e);
                tracing::warn!("无法使用检查点，从头开始");
                CheckpointRecord::default()
            }
        }
    }

    /// 保存连续完成的前缀
    pub fn save_checkpoint(&self, slots: &[Option<String>]) -> TranslationResult<CheckpointRecord> {
        let record = CheckpointRecord::from_slots(slots);
        record.save(&self.checkpoint_path)?;
        Ok(record)
    }

    /// 运行到全部完成
    pub async fn run<P: BlockProcessor>(
        &self,
        blocks: &[MessageBlock],
        processor: &P,
    ) -> TranslationResult<RunOutcome> {
        self.run_with_shutdown(blocks, processor, std::future::pending::<()>())
            .await
    }

    /// 运行，直到全部完成或 `shutdown` 先完成
    pub async fn run_with_shutdown<P, S>(
        &self,
        blocks: &[MessageBlock],
        processor: &P,
        shutdown: S,
    ) -> TranslationResult<RunOutcome>
    where
        P: BlockProcessor,
        S: Future<Output = ()>,
    {
        let total = blocks.len();
        let record = self.load_checkpoint(total);
        let start = record.watermark;

        let mut initial = vec![None; total];
        for (slot, entry) in initial.iter_mut().zip(record.entries) {
            *slot = Some(entry);
        }

        let slots = Mutex::new(initial);
        let cursor = AtomicUsize::new(start);
        let completed = AtomicUsize::new(0);

        tracing::info!("从第 {}/{} 条开始", start, total);

        let (slots_ref, cursor, completed) = (&slots, &cursor, &completed);
        let workers = (0..self.concurrency).map(|_| async move {
            loop {
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                if index >= total {
                    break;
                }

                let block = &blocks[index];
                let output = processor.process(block).await;

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                self.report(done, block, &output, total);

                lock(slots_ref)[index] = Some(output);
            }
        });

        tokio::select! {
            _ = join_all(workers) => {}
            _ = shutdown => {
                let record = self.save_checkpoint(&lock(&slots))?;
                tracing::warn!("收到中断信号，已保存 {} 条", record.watermark);
                return Ok(RunOutcome::Interrupted {
                    watermark: record.watermark,
                });
            }
        }

        let outputs = slots
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();

        Ok(RunOutcome::Completed(outputs))
    }

    fn report(&self, done: usize, block: &MessageBlock, output: &str, total: usize) {
        if self.progress_interval > 0 && done % self.progress_interval == 0 {
            tracing::info!("{} / {}", block.index + 1, total);
        }
        if self.preview_interval > 0 && done % self.preview_interval == 0 {
            tracing::debug!("FROM:\n{}\nTO:\n{}", block.text, output);
        }
    }
}

fn lock(slots: &Mutex<Vec<Option<String>>>) -> MutexGuard<'_, Vec<Option<String>>> {
    slots.lock().unwrap_or_else(|e| e.into_inner())
}
