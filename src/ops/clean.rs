// src/ops/clean.rs

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::Result;
use crate::fs::run_blocking;

use super::Leaves;

/// Remove every configured clean directory.
///
/// Missing directories are fine, so running this twice in a row succeeds
/// both times.
pub async fn run(leaves: &Leaves) -> Result<()> {
    for dir in leaves.config().clean_dirs() {
        let path = leaves.project_root().join(&dir);
        let removed =
            run_blocking(Arc::clone(leaves.fs()), move |fs| fs.remove_dir_all(&path)).await?;
        if removed {
            info!(dir = %dir.display(), "removed");
        } else {
            debug!(dir = %dir.display(), "nothing to remove");
        }
    }
    Ok(())
}
