// src/ops/mod.rs

//! Leaf operations.
//!
//! - [`clean`] removes the configured output directories.
//! - [`transform`] runs a route's stage chain over every matching source.
//! - [`publish`] hands the output root to the external publisher.
//!
//! [`Leaves`] binds these to a validated config, a project root and a
//! [`FileSystem`], and is what the executor calls through [`LeafRunner`].

pub mod clean;
pub mod publish;
pub mod sources;
pub mod transform;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::task::LeafKind;
use crate::types::AssetClass;

pub use sources::{SourceSet, glob_base, output_path};

/// Anything able to run a leaf to completion.
///
/// Completion of the returned future is the leaf's completion signal.
pub trait LeafRunner: Send + Sync {
    fn run_leaf(&self, leaf: LeafKind) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production leaf runner.
#[derive(Clone)]
pub struct Leaves {
    cfg: Arc<ConfigFile>,
    project_root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for Leaves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaves")
            .field("project_root", &self.project_root)
            .finish_non_exhaustive()
    }
}

impl Leaves {
    pub fn new(
        cfg: Arc<ConfigFile>,
        project_root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            cfg,
            project_root: project_root.into(),
            fs,
        }
    }

    /// Leaves operating on the real filesystem.
    pub fn real(cfg: Arc<ConfigFile>, project_root: impl Into<PathBuf>) -> Self {
        Self::new(cfg, project_root, Arc::new(RealFileSystem))
    }

    pub fn config(&self) -> &ConfigFile {
        &self.cfg
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub async fn run(&self, leaf: LeafKind) -> Result<()> {
        match leaf {
            LeafKind::Clean => clean::run(self).await,
            LeafKind::CompileMarkup => transform::run_route(self, AssetClass::Markup).await,
            LeafKind::OptimizeImages => transform::run_route(self, AssetClass::Images).await,
            LeafKind::CompileStyles => transform::run_route(self, AssetClass::Styles).await,
            LeafKind::CompileScripts => transform::run_route(self, AssetClass::Scripts).await,
            LeafKind::Publish => publish::run(self).await,
        }
    }
}

impl LeafRunner for Leaves {
    fn run_leaf(&self, leaf: LeafKind) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(self.run(leaf))
    }
}
