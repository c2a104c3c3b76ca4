// src/ops/transform.rs

//! Route transforms.
//!
//! Every source matched by a route is read, piped through the route's
//! stages in order (each stage's stdout feeds the next stage's stdin) and
//! written under `dest`. A route without stages copies its files.
//!
//! Files are processed concurrently. How a per-file error is handled comes
//! from the route's `on_error`:
//!
//! - `fail`: the leaf fails once all in-flight files have finished.
//! - `warn`: the error is logged, that file's output is skipped and the leaf
//!   still succeeds.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::errors::{Result, SitepipeError};
use crate::exec::{expand_placeholders, run_filter};
use crate::fs::{FileSystem, run_blocking};
use crate::types::{AssetClass, OnError};

use super::Leaves;
use super::sources::{SourceSet, output_path};

/// Everything one file needs, owned so it can move into a spawned task.
#[derive(Clone)]
struct StageChain {
    steps: Arc<Vec<String>>,
    project_root: PathBuf,
    output_root: String,
    fs: Arc<dyn FileSystem>,
}

/// Run the transform for `class` over all of its sources.
pub async fn run_route(leaves: &Leaves, class: AssetClass) -> Result<()> {
    let cfg = leaves.config();
    let route = cfg.route(class);
    let root = leaves.project_root();

    let sources = SourceSet::from_route(route)?;
    let files = {
        let sources = sources.clone();
        let root = root.to_path_buf();
        run_blocking(Arc::clone(leaves.fs()), move |fs| sources.collect(fs, &root)).await?
    };

    if files.is_empty() {
        warn!(route = %class, pattern = %route.src, "no source files matched");
        return Ok(());
    }

    info!(route = %class, files = files.len(), "transforming");

    let chain = StageChain {
        steps: Arc::new(route.steps.clone()),
        project_root: root.to_path_buf(),
        output_root: cfg.output_root().to_string_lossy().into_owned(),
        fs: Arc::clone(leaves.fs()),
    };

    let limit = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    let permits = Arc::new(Semaphore::new(limit));

    let mut set = JoinSet::new();
    let total = files.len();
    for src in files {
        let dest = output_path(
            Path::new(&route.dest),
            sources.base(),
            &src,
            route.extension.as_deref(),
        );
        let chain = chain.clone();
        let permits = Arc::clone(&permits);

        set.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let result = chain.process(&src, &dest).await;
            (src, dest, result)
        });
    }

    let mut failures: Vec<(PathBuf, SitepipeError)> = Vec::new();
    while let Some(joined) = set.join_next().await {
        let (src, dest, result) = match joined {
            Ok(done) => done,
            Err(join_err) => {
                failures.push((PathBuf::new(), anyhow!("file task panicked: {join_err}").into()));
                continue;
            }
        };

        match result {
            Ok(()) => debug!(route = %class, src = %src.display(), dest = %dest.display(), "written"),
            Err(err) => match route.on_error {
                OnError::Warn => {
                    warn!(route = %class, src = %src.display(), error = %err, "skipping file");
                }
                OnError::Fail => {
                    error!(route = %class, src = %src.display(), error = %err, "file failed");
                    failures.push((src, err));
                }
            },
        }
    }

    match failures.len() {
        0 => Ok(()),
        1 => Err(failures.remove(0).1),
        n => {
            let (src, first) = failures.remove(0);
            Err(anyhow!(
                "{n} of {total} {class} files failed; first ({}): {first}",
                src.display()
            )
            .into())
        }
    }
}

impl StageChain {
    async fn process(&self, src: &Path, dest: &Path) -> Result<()> {
        let src_path = self.project_root.join(src);
        let mut bytes = run_blocking(Arc::clone(&self.fs), move |fs| fs.read(&src_path)).await?;

        let src_str = slash_path(src);
        let dest_str = slash_path(dest);
        let vars = [
            ("src", src_str.as_str()),
            ("dest", dest_str.as_str()),
            ("root", self.output_root.as_str()),
        ];

        for step in self.steps.iter() {
            let cmd = expand_placeholders(step, &vars);
            bytes = run_filter(&cmd, &self.project_root, bytes).await?;
        }

        let dest_path = self.project_root.join(dest);
        run_blocking(Arc::clone(&self.fs), move |fs| fs.write(&dest_path, &bytes)).await?;
        Ok(())
    }
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
