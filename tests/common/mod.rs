// 集成测试公共模块
//
// 提供替身翻译服务、示例源码和临时目录辅助工具

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use eztr_garble::translation::{TranslationBackend, TranslationConfig, TranslationError, TranslationResult};
use tempfile::TempDir;

/// 五条消息：普通、带按钮、多字面量、没有字面量、缺少头部
pub const SAMPLE_SOURCE: &str = r#"// messages.h
DEFINE_MESSAGE(0x0001, TEXTBOX_TYPE_0, TEXTBOX_POS_BOTTOM,
MSG(
HEADER(0x00, 0x03, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF)
"Welcome to the village."
)
)

DEFINE_MESSAGE(0x0002, TEXTBOX_TYPE_0, TEXTBOX_POS_BOTTOM,
MSG(
HEADER(0x00, 0xFE, 0x0003, 0xFFFF, 0x0014, 0xFFFF)
"Press [A] to talk"
)
)

DEFINE_MESSAGE(0x0003, TEXTBOX_TYPE_1, TEXTBOX_POS_TOP,
MSG(
HEADER(0x00, 0xFE, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF)
COLOR(RED) "Hello" COLOR_DEFAULT BOX_BREAK "see you soon!"
)
)

DEFINE_MESSAGE(0x0004, TEXTBOX_TYPE_0, TEXTBOX_POS_BOTTOM,
MSG(
HEADER(0x00, 0xFE, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF)
BOX_BREAK
)
)

DEFINE_MESSAGE(0x0005, TEXTBOX_TYPE_0, TEXTBOX_POS_BOTTOM,
MSG("no header here")
)
"#;

/// 示例源码中的消息数
pub const SAMPLE_COUNT: usize = 5;

/// 生成 `count` 条简单消息
pub fn numbered_source(count: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                "DEFINE_MESSAGE({i}, TEXTBOX_TYPE_0, TEXTBOX_POS_BOTTOM, MSG(HEADER(0x00, 0xFE, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF) \"line number {i}\"))\n"
            )
        })
        .collect()
}

/// 最后一跳回到目标语言时把文本转成大写，其余各跳原样返回
///
/// 结果与语言路径无关，适合比较输出。
pub fn shout(target: &str, text: &str) -> String {
    if target == "en" {
        text.to_uppercase()
    } else {
        text.to_string()
    }
}

#[derive(Default)]
pub struct ShoutBackend {
    calls: AtomicUsize,
}

impl ShoutBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TranslationBackend for ShoutBackend {
    async fn translate(&self, _: &str, target: &str, text: &str) -> TranslationResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(shout(target, text))
    }
}

/// 把换行吞掉，拼接翻译永远拆不回原来的段数
pub struct MergingBackend;

impl TranslationBackend for MergingBackend {
    async fn translate(&self, _: &str, target: &str, text: &str) -> TranslationResult<String> {
        Ok(shout(target, &text.replace('\n', "")))
    }
}

pub struct FailingBackend;

impl TranslationBackend for FailingBackend {
    async fn translate(&self, _: &str, _: &str, _: &str) -> TranslationResult<String> {
        Err(TranslationError::NetworkError("connection refused".to_string()))
    }
}

/// 遇到包含指定文本的请求时永远不返回，其余同 `ShoutBackend`
pub struct StallingBackend {
    pub stall_on: &'static str,
}

impl TranslationBackend for StallingBackend {
    async fn translate(&self, _: &str, target: &str, text: &str) -> TranslationResult<String> {
        if text.contains(self.stall_on) {
            std::future::pending::<()>().await;
        }
        Ok(shout(target, text))
    }
}

/// 输出和检查点都放在临时目录里的配置
pub fn test_config(dir: &Path) -> TranslationConfig {
    TranslationConfig {
        seed: Some(42),
        max_concurrent_requests: 3,
        checkpoint_path: dir.join("checkpoint_data.c").display().to_string(),
        output_path: dir.join("poorly_translated.c").display().to_string(),
        ..TranslationConfig::default()
    }
}

pub fn compile_only_config(dir: &Path) -> TranslationConfig {
    TranslationConfig {
        enabled: false,
        ..test_config(dir)
    }
}

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

pub fn write_input(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("messages.h");
    std::fs::write(&path, content).expect("Failed to write input file");
    path
}

pub fn read_output(config: &TranslationConfig) -> String {
    std::fs::read_to_string(&config.output_path).expect("Output file should exist")
}
