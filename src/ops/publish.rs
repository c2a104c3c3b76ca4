// src/ops/publish.rs

use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::exec::{expand_placeholders, run_command};
use crate::fs::run_blocking;

use super::Leaves;

/// Publish the output root with the configured external command.
///
/// The output root is created first, so an empty payload is published
/// rather than failing on a missing directory.
pub async fn run(leaves: &Leaves) -> Result<()> {
    let cfg = leaves.config();
    let root = leaves.project_root();

    let out_dir = root.join(cfg.output_root());
    run_blocking(Arc::clone(leaves.fs()), move |fs| fs.create_dir_all(&out_dir)).await?;

    let output_root = cfg.output_root().to_string_lossy();
    let staging = cfg
        .staging_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cmd = expand_placeholders(
        &cfg.publish().cmd,
        &[("root", &*output_root), ("staging", staging.as_str())],
    );

    info!(cmd = %cmd, "publishing");
    run_command(&cmd, root).await?;
    info!(root = %output_root, "published");
    Ok(())
}
