// tests/leaf_operations.rs
#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;

use sitepipe::errors::SitepipeError;
use sitepipe::ops::Leaves;
use sitepipe::task::LeafKind;
use sitepipe::types::{AssetClass, OnError};
use sitepipe_test_utils::builders::{ConfigFileBuilder, RouteConfigBuilder, shell_only_config};
use sitepipe_test_utils::{init_tracing, write_files};

fn leaves(root: &Path, builder: ConfigFileBuilder) -> Leaves {
    Leaves::real(Arc::new(builder.build()), root)
}

#[tokio::test]
async fn clean_twice_never_fails() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("build/index.html", "x"), ("build/css/a.css", "y")]);

    let leaves = leaves(dir.path(), shell_only_config());
    leaves.run(LeafKind::Clean).await.unwrap();
    assert!(!dir.path().join("build").exists());
    leaves.run(LeafKind::Clean).await.unwrap();
}

#[tokio::test]
async fn stages_run_in_order_on_stdin() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("src/index.pug", "hello\n")]);

    let builder = ConfigFileBuilder::new().with_route(
        AssetClass::Markup,
        RouteConfigBuilder::new("src/*.pug", "build")
            .extension("html")
            .step("tr a-z A-Z")
            .step("sed 's/^/<p>/'")
            .build(),
    );
    leaves(dir.path(), builder)
        .run(LeafKind::CompileMarkup)
        .await
        .unwrap();

    let out = std::fs::read_to_string(dir.path().join("build/index.html")).unwrap();
    assert_eq!(out, "<p>HELLO\n");
}

#[tokio::test]
async fn placeholders_are_expanded_per_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("src/js/main.js", "let a = 1;\n")]);

    let builder = ConfigFileBuilder::new().with_route(
        AssetClass::Scripts,
        RouteConfigBuilder::new("src/js/main.js", "build/js")
            .step("echo '{src} -> {dest} in {root}'")
            .build(),
    );
    leaves(dir.path(), builder)
        .run(LeafKind::CompileScripts)
        .await
        .unwrap();

    let out = std::fs::read_to_string(dir.path().join("build/js/main.js")).unwrap();
    assert_eq!(out, "src/js/main.js -> build/js/main.js in build\n");
}

#[tokio::test]
async fn style_errors_are_downgraded_to_warnings() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_files(
        dir.path(),
        &[("src/scss/good.scss", "a {}\n"), ("src/scss/bad.scss", "a {\n")],
    );

    let builder = ConfigFileBuilder::new().with_route(
        AssetClass::Styles,
        RouteConfigBuilder::new("src/scss/*.scss", "build/css")
            .extension("css")
            .step("if grep -q '}'; then cat {src}; else echo 'unbalanced braces' >&2; exit 1; fi")
            .on_error(OnError::Warn)
            .build(),
    );
    leaves(dir.path(), builder)
        .run(LeafKind::CompileStyles)
        .await
        .unwrap();

    assert!(dir.path().join("build/css/good.css").exists());
    assert!(!dir.path().join("build/css/bad.css").exists());
}

#[tokio::test]
async fn script_errors_fail_the_leaf() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("src/js/main.js", "syntax error(\n")]);

    let builder = ConfigFileBuilder::new().with_route(
        AssetClass::Scripts,
        RouteConfigBuilder::new("src/js/main.js", "build/js")
            .step("echo 'Unexpected token' >&2; exit 3")
            .build(),
    );
    let err = leaves(dir.path(), builder)
        .run(LeafKind::CompileScripts)
        .await
        .unwrap_err();

    match err {
        SitepipeError::ToolFailed { code, stderr, .. } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "Unexpected token");
        }
        other => panic!("Expected ToolFailed, got: {other:?}"),
    }
    assert!(!dir.path().join("build/js/main.js").exists());
}

#[tokio::test]
async fn failing_file_does_not_stop_other_files() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_files(
        dir.path(),
        &[("src/a.pug", "ok\n"), ("src/b.pug", "fail\n"), ("src/c.pug", "ok\n")],
    );

    let builder = ConfigFileBuilder::new().with_route(
        AssetClass::Markup,
        RouteConfigBuilder::new("src/*.pug", "build")
            .extension("html")
            .step("grep -v fail")
            .build(),
    );
    let result = leaves(dir.path(), builder).run(LeafKind::CompileMarkup).await;

    assert!(result.is_err());
    assert!(dir.path().join("build/a.html").exists());
    assert!(dir.path().join("build/c.html").exists());
    assert!(!dir.path().join("build/b.html").exists());
}

#[tokio::test]
async fn publish_with_missing_output_root_ships_empty_payload() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let builder = shell_only_config().publish_cmd("ls -A {root} > published.txt");
    leaves(dir.path(), builder).run(LeafKind::Publish).await.unwrap();

    let listing = std::fs::read_to_string(dir.path().join("published.txt")).unwrap();
    assert!(listing.is_empty());
}

#[tokio::test]
async fn publish_failure_is_reported() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let builder = shell_only_config().publish_cmd("echo 'auth failed' >&2; exit 128");
    let err = leaves(dir.path(), builder)
        .run(LeafKind::Publish)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("auth failed"));
}
