//! 文本处理管道
//!
//! - `segments`: 引号字面量的提取、解码和短语剥离
//! - `reconciler`: 批量翻译、逐段回退、译文修正和写回
//! - `checkpoint`: 续传记录的读写
//! - `scheduler`: 有界并发调度和中断处理

pub mod checkpoint;
pub mod reconciler;
pub mod scheduler;
pub mod segments;

pub use checkpoint::{CheckpointRecord, CONTINUE_MARKER_PREFIX};
pub use reconciler::{reinsert, ResultReconciler};
pub use scheduler::{BlockProcessor, CheckpointedScheduler, RunOutcome};
pub use segments::{extract_segments, QuotedSegment};
