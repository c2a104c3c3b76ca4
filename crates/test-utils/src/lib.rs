pub mod builders;
pub mod fake_executor;

use std::path::Path;
use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 10-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

/// Write `files` (relative path, contents) under `root`, creating parents.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
    }
}

/// A minimal project with one source file per route.
pub fn write_sample_site(root: &Path) {
    write_files(
        root,
        &[
            ("src/index.pug", "hello page\n"),
            ("src/partials/head.pug", "partial\n"),
            ("src/img/logo.png", "PNGDATA"),
            ("src/scss/style.scss", "body { color: red; }\n"),
            ("src/scss/_vars.scss", "$x: 1;\n"),
            ("src/js/main.js", "console.log('hi');\n"),
        ],
    );
}
