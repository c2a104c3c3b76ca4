// src/ops/sources.rs

//! Source selection for a route: which files a `src` glob picks, and where
//! each one lands under `dest`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::GlobSet;

use crate::config::RouteConfig;
use crate::fs::FileSystem;
use crate::watch::patterns::build_globset;

/// Compiled `src` + `exclude` globs of one route.
#[derive(Debug, Clone)]
pub struct SourceSet {
    base: PathBuf,
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl SourceSet {
    pub fn from_route(route: &RouteConfig) -> Result<Self> {
        let include = build_globset(std::slice::from_ref(&route.src))
            .with_context(|| format!("compiling src glob {}", route.src))?;
        let exclude = if route.exclude.is_empty() {
            None
        } else {
            Some(build_globset(&route.exclude).context("compiling exclude globs")?)
        };

        Ok(Self {
            base: glob_base(&route.src),
            include,
            exclude,
        })
    }

    /// Directory the `src` glob is anchored at; output paths keep the
    /// structure below it.
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.include.is_match(rel_path)
            && !self
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.is_match(rel_path))
    }

    /// Every matching file under `root`, as sorted paths relative to `root`.
    pub fn collect(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
        let start = root.join(&self.base);
        if !fs.is_dir(&start) {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut stack = vec![start];

        while let Some(dir) = stack.pop() {
            for path in fs.read_dir(&dir)? {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    if let Ok(rel) = path.strip_prefix(root) {
                        let rel_str = rel.to_string_lossy().replace('\\', "/");
                        if self.matches(&rel_str) {
                            files.push(rel.to_path_buf());
                        }
                    }
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

/// Literal directory prefix of a glob.
///
/// `src/scss/**/*.scss` -> `src/scss`; a fully literal pattern such as
/// `src/js/main.js` yields its parent, `src/js`.
pub fn glob_base(pattern: &str) -> PathBuf {
    let parts: Vec<&str> = pattern
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();

    let literal = parts.iter().take_while(|p| !has_glob_meta(p)).count();
    let take = if literal == parts.len() {
        literal.saturating_sub(1)
    } else {
        literal
    };

    parts[..take].iter().collect()
}

fn has_glob_meta(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// Where `rel_src` lands: `dest` + its path below `base`, with the extension
/// replaced when one is given.
pub fn output_path(dest: &Path, base: &Path, rel_src: &Path, extension: Option<&str>) -> PathBuf {
    let tail = match rel_src.strip_prefix(base) {
        Ok(tail) => tail.to_path_buf(),
        Err(_) => rel_src.file_name().map(PathBuf::from).unwrap_or_default(),
    };

    let mut out = dest.join(tail);
    if let Some(ext) = extension {
        out.set_extension(ext);
    }
    out
}

