// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::ConfigFile;
use crate::task::LeafKind;
use crate::types::AssetClass;

/// Compiled watch/exclude glob patterns for a single route.
///
/// The patterns are relative to the project root. The watcher passes
/// relative paths (e.g. `"src/scss/_vars.scss"`) into `matches`.
#[derive(Clone)]
pub struct RouteWatchProfile {
    class: AssetClass,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for RouteWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteWatchProfile")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

impl RouteWatchProfile {
    pub fn class(&self) -> AssetClass {
        self.class
    }

    /// The leaf re-run when this route's files change.
    pub fn leaf(&self) -> LeafKind {
        LeafKind::for_class(self.class)
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build one watch profile per route.
///
/// A route watches its `watch` glob (falling back to `src`) minus its
/// `exclude` globs.
pub fn build_route_profiles(cfg: &ConfigFile) -> Result<Vec<RouteWatchProfile>> {
    let mut profiles = Vec::with_capacity(AssetClass::ALL.len());

    for (class, route) in cfg.routes().iter() {
        let watch_set = build_globset(&[route.watch_pattern().to_string()])
            .with_context(|| format!("building watch globset for route {class}"))?;

        let exclude_set = if route.exclude.is_empty() {
            None
        } else {
            Some(
                build_globset(&route.exclude)
                    .with_context(|| format!("building exclude globset for route {class}"))?,
            )
        };

        profiles.push(RouteWatchProfile {
            class,
            watch_set,
            exclude_set,
        });
    }

    Ok(profiles)
}

/// Build a GlobSet from simple string patterns.
///
/// `*` does not cross `/`; use `**` for recursive matches.
pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat.trim_start_matches("./"))
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
