//! 断点续传记录
//!
//! 文件内容是从第 0 条开始连续完成的输出，用换行连接，最后一行是
//! `// CONTINUE FROM <水位>`。第一个空位之后已经完成的条目不会被保存。

use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::builders::SKIP_MARKER_PREFIX;
use crate::translation::error::{helpers, TranslationError, TranslationResult};

/// 续传标记的前缀
pub const CONTINUE_MARKER_PREFIX: &str = "// CONTINUE FROM";

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^// CONTINUE FROM (\d+)$").expect("marker pattern is valid"));

/// 一次保存的进度
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointRecord {
    /// 连续完成的条目数，也是下一次开始调度的序号
    pub watermark: usize,
    /// 前 `watermark` 条输出
    pub entries: Vec<String>,
}

impl CheckpointRecord {
    /// 取最长的连续已完成前缀
    pub fn from_slots(slots: &[Option<String>]) -> Self {
        let entries: Vec<String> = slots.iter().map_while(|slot| slot.clone()).collect();

        Self {
            watermark: entries.len(),
            entries,
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n{} {}",
            self.entries.join("\n"),
            CONTINUE_MARKER_PREFIX,
            self.watermark
        )
    }

    /// 解析文件内容；最后一行不是续传标记时返回 `None`
    ///
    /// 条目以单独一行的 `);` 或跳过标记结束，条目数必须与水位一致。
    pub fn parse(data: &str) -> TranslationResult<Option<Self>> {
        let data = data.trim_end();
        let (body, last_line) = data.rsplit_once('\n').unwrap_or(("", data));

        let Some(caps) = MARKER_RE.captures(last_line) else {
            return Ok(None);
        };
        let watermark: usize = caps[1]
            .parse()
            .map_err(|e| helpers::checkpoint_error(format!("无效的水位 {}: {}", &caps[1], e)))?;

        let mut entries = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in body.split('\n') {
            current.push(line);
            if line == ");" || line.starts_with(SKIP_MARKER_PREFIX) {
                entries.push(current.join("\n"));
                current.clear();
            }
        }

        if current.iter().any(|line| !line.trim().is_empty()) {
            return Err(helpers::checkpoint_error("最后一个条目不完整"));
        }

        if entries.len() != watermark {
            return Err(helpers::checkpoint_error(format!(
                "水位为 {}，但文件中有 {} 个条目",
                watermark,
                entries.len()
            )));
        }

        Ok(Some(Self { watermark, entries }))
    }

    /// 读取检查点文件，文件不存在时返回 `None`
    pub fn load(path: &Path) -> TranslationResult<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(data) => Self::parse(&data),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TranslationError::from(e).with_context(path.display())),
        }
    }

    /// 覆盖写入检查点文件
    pub fn save(&self, path: &Path) -> TranslationResult<()> {
        tracing::info!("保存进度到 {} (水位 {})", path.display(), self.watermark);
        std::fs::write(path, self.render())
            .map_err(|e| TranslationError::from(e).with_context(path.display()))
    }

    /// 删除检查点文件，文件不存在不算错误
    pub fn remove(path: &Path) -> TranslationResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TranslationError::from(e).with_context(path.display())),
        }
    }
}
