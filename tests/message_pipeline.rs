//! 消息处理管道集成测试
//!
//! 从源码到输出文件的完整流程，使用替身翻译服务

use eztr_garble::core::{compile_messages, MessagePipeline};
use eztr_garble::translation::RunOutcome;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{
    compile_only_config, read_output, temp_dir, test_config, FailingBackend, MergingBackend,
    ShoutBackend, SAMPLE_COUNT, SAMPLE_SOURCE,
};

fn entries(outcome: RunOutcome) -> Vec<String> {
    match outcome {
        RunOutcome::Completed(entries) => entries,
        other => panic!("Expected a completed run, got {other:?}"),
    }
}

#[tokio::test]
async fn test_compile_only_run_never_calls_the_service() {
    let dir = temp_dir();
    let config = compile_only_config(dir.path());
    let backend = ShoutBackend::default();
    let pipeline = MessagePipeline::new(&backend, config.clone());

    let outcome = pipeline
        .run(SAMPLE_SOURCE, true, std::future::pending())
        .await
        .expect("Run should succeed");

    assert_eq!(entries(outcome).len(), SAMPLE_COUNT);
    assert_eq!(backend.calls(), 0);
    assert_eq!(read_output(&config), compile_messages(SAMPLE_SOURCE));
}

#[test]
fn test_compiled_file_layout() {
    let out = compile_messages(SAMPLE_SOURCE);

    assert!(out.starts_with("#include \"eztr_api.h\"\n\nEZTR_ON_INIT void replace_msgs() {\n"));
    assert!(out.ends_with("\n}"));

    let expected_first = r#"    EZTR_Basic_ReplaceText(
        0x0001,
        TEXTBOX_TYPE_0,
        TEXTBOX_POS_BOTTOM,
        0x03,
        EZTR_NO_VALUE,
        EZTR_NO_VALUE,
        EZTR_NO_VALUE,
        false,
        "Welcome to the village." EZTR_CC_END,
        NULL
    );"#;
    assert!(out.contains(expected_first), "{out}");

    assert!(out.contains("        0x0003,\n        EZTR_NO_VALUE,\n        0x0014,\n"));
    assert!(out.contains(r#""Press " EZTR_CC_BTN_A " to talk" EZTR_CC_END"#));
    assert!(out.contains("    // Skipped #4\n    // Skipped #5\n}"));
}

#[tokio::test]
async fn test_translated_run_rewrites_only_literals() {
    let dir = temp_dir();
    let config = test_config(dir.path());
    let pipeline = MessagePipeline::new(ShoutBackend::default(), config.clone());

    let entries = entries(
        pipeline
            .run(SAMPLE_SOURCE, true, std::future::pending())
            .await
            .expect("Run should succeed"),
    );

    assert!(entries[0].contains(r#""WELCOME TO THE VILLAGE." EZTR_CC_END"#));
    // 按钮占位符原样保留，两侧文本分别翻译
    assert!(entries[1].contains(r#""PRESS " EZTR_CC_BTN_A " TO TALK" EZTR_CC_END"#));
    assert!(entries[2].contains(
        r#"EZTR_CC_RED "HELLO" EZTR_CC_COLOR_DEFAULT EZTR_CC_BOX_BREAK "SEE YOU SOON!" EZTR_CC_END"#
    ));
    assert_eq!(entries[3], "// Skipped #4");
    assert_eq!(entries[4], "// Skipped #5");

    let stats = pipeline.chain().stats();
    assert_eq!(stats.failed_chains, 0);
    assert!(stats.chains_completed >= 4);

    assert!(read_output(&config).contains("\"WELCOME TO THE VILLAGE.\""));
    assert!(!std::path::Path::new(&config.checkpoint_path).exists());
}

#[tokio::test]
async fn test_segment_mismatch_falls_back_to_same_literals() {
    let dir = temp_dir();
    let merged = MessagePipeline::new(MergingBackend, test_config(dir.path()));
    let shouted = MessagePipeline::new(ShoutBackend::default(), test_config(dir.path()));

    let merged = entries(merged.run(SAMPLE_SOURCE, false, std::future::pending()).await.unwrap());
    let shouted = entries(shouted.run(SAMPLE_SOURCE, false, std::future::pending()).await.unwrap());

    assert_eq!(merged, shouted);
}

#[tokio::test]
async fn test_unreachable_service_leaves_text_untouched() {
    let dir = temp_dir();
    let config = test_config(dir.path());
    let pipeline = MessagePipeline::new(FailingBackend, config.clone());

    pipeline
        .run(SAMPLE_SOURCE, true, std::future::pending())
        .await
        .expect("Service failures are not fatal");

    assert_eq!(read_output(&config), compile_messages(SAMPLE_SOURCE));
    assert!(pipeline.chain().stats().failed_chains > 0);
    assert!(pipeline.chain().cache().size() == 0);
}

#[tokio::test]
async fn test_disallowed_characters_after_translation() {
    let dir = temp_dir();
    let source = "DEFINE_MESSAGE(1, T, Y, MSG(HEADER(0, 1, 2, 3, 4, 5) \"na\u{ef}ve caf\u{e9}\"))";
    let pipeline = MessagePipeline::new(ShoutBackend::default(), test_config(dir.path()));

    let entries = entries(pipeline.run(source, true, std::future::pending()).await.unwrap());

    // 大写后的 Ï 和 É 仍然不在白名单里
    assert!(entries[0].contains(r#""NA VE CAF " EZTR_CC_END"#), "{}", entries[0]);
}

#[tokio::test]
async fn test_empty_input_writes_empty_function() {
    let dir = temp_dir();
    let config = compile_only_config(dir.path());
    let pipeline = MessagePipeline::new(FailingBackend, config.clone());

    let outcome = pipeline.run("no messages here", true, std::future::pending()).await.unwrap();

    assert_eq!(outcome, RunOutcome::Completed(Vec::new()));
    assert_eq!(
        read_output(&config),
        "#include \"eztr_api.h\"\n\nEZTR_ON_INIT void replace_msgs() {\n\n}"
    );
}
