// src/task/mod.rs

//! Task model: leaf operations and the two combinators.
//!
//! A [`Task`] is either a single [`LeafKind`] or a named [`Composite`] that
//! runs its children `sequential`ly or in `parallel`. Trees are built once
//! (see [`entry`]) and never change at run time; the DAG scheduler consumes
//! them through [`crate::dag::DagGraph::from_task`].

pub mod entry;

use std::fmt;
use std::str::FromStr;

use crate::errors::SitepipeError;
use crate::types::AssetClass;

pub use entry::{EntryPoint, Pipeline, ServiceKind};

/// The smallest invocable unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LeafKind {
    /// Recursively delete the configured output directories.
    Clean,
    CompileMarkup,
    OptimizeImages,
    CompileStyles,
    CompileScripts,
    /// Push the output root to the static-hosting branch.
    Publish,
}

impl LeafKind {
    pub const ALL: [LeafKind; 6] = [
        LeafKind::Clean,
        LeafKind::CompileMarkup,
        LeafKind::OptimizeImages,
        LeafKind::CompileStyles,
        LeafKind::CompileScripts,
        LeafKind::Publish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeafKind::Clean => "clean",
            LeafKind::CompileMarkup => "markup",
            LeafKind::OptimizeImages => "images",
            LeafKind::CompileStyles => "styles",
            LeafKind::CompileScripts => "scripts",
            LeafKind::Publish => "publish",
        }
    }

    /// Leaf that compiles the given asset class.
    pub fn for_class(class: AssetClass) -> Self {
        match class {
            AssetClass::Markup => LeafKind::CompileMarkup,
            AssetClass::Images => LeafKind::OptimizeImages,
            AssetClass::Styles => LeafKind::CompileStyles,
            AssetClass::Scripts => LeafKind::CompileScripts,
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeafKind {
    type Err = SitepipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        LeafKind::ALL
            .into_iter()
            .find(|leaf| leaf.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = LeafKind::ALL.iter().map(|l| l.as_str()).collect();
                SitepipeError::UnknownTask(format!(
                    "'{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// How a composite runs its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Strict declared order; a failure stops the sequence.
    Sequential,
    /// All at once; siblings are never cancelled.
    Parallel,
}

/// A named grouping of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    pub name: String,
    pub combinator: Combinator,
    pub children: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Leaf(LeafKind),
    Composite(Composite),
}

impl Task {
    pub fn leaf(kind: LeafKind) -> Self {
        Task::Leaf(kind)
    }

    pub fn sequential(name: impl Into<String>, children: Vec<Task>) -> Self {
        Task::Composite(Composite {
            name: name.into(),
            combinator: Combinator::Sequential,
            children,
        })
    }

    pub fn parallel(name: impl Into<String>, children: Vec<Task>) -> Self {
        Task::Composite(Composite {
            name: name.into(),
            combinator: Combinator::Parallel,
            children,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Task::Leaf(kind) => kind.as_str(),
            Task::Composite(c) => &c.name,
        }
    }

    /// Indented tree rendering, used by `--dry-run`.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Task::Leaf(kind) => {
                out.push_str(&format!("{indent}- {kind}\n"));
            }
            Task::Composite(c) => {
                let tag = match c.combinator {
                    Combinator::Sequential => "sequential",
                    Combinator::Parallel => "parallel",
                };
                out.push_str(&format!("{indent}{} ({tag})\n", c.name));
                for child in &c.children {
                    child.render_into(out, depth + 1);
                }
            }
        }
    }
}

impl From<LeafKind> for Task {
    fn from(kind: LeafKind) -> Self {
        Task::Leaf(kind)
    }
}
