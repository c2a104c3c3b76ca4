// src/task/entry.rs

//! The three externally invocable pipelines.

use std::fmt;

use crate::task::{LeafKind, Task};

/// Long-running units started after a pipeline's task tree has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// External HTTP server with live reload over the output root.
    Serve,
    /// Filesystem observer re-running leaves on matching changes.
    Watch,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Serve => f.write_str("serve"),
            ServiceKind::Watch => f.write_str("watch"),
        }
    }
}

/// A finite task tree plus the services to start once it succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub name: String,
    pub task: Task,
    pub services: Vec<ServiceKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Build,
    Dev,
    Deploy,
}

impl EntryPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Build => "build",
            EntryPoint::Dev => "dev",
            EntryPoint::Deploy => "deploy",
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        match self {
            EntryPoint::Build => Pipeline {
                name: self.as_str().to_string(),
                task: build_task(),
                services: Vec::new(),
            },
            // build, then serve + watch until shutdown
            EntryPoint::Dev => Pipeline {
                name: self.as_str().to_string(),
                task: build_task(),
                services: vec![ServiceKind::Serve, ServiceKind::Watch],
            },
            EntryPoint::Deploy => Pipeline {
                name: self.as_str().to_string(),
                task: deploy_task(),
                services: Vec::new(),
            },
        }
    }
}

/// `build = sequential(parallel(clean, images), sequential(markup, styles, scripts))`
pub fn build_task() -> Task {
    Task::sequential(
        "build",
        vec![
            Task::parallel(
                "prepare",
                vec![
                    Task::leaf(LeafKind::Clean),
                    Task::leaf(LeafKind::OptimizeImages),
                ],
            ),
            Task::sequential(
                "assets",
                vec![
                    Task::leaf(LeafKind::CompileMarkup),
                    Task::leaf(LeafKind::CompileStyles),
                    Task::leaf(LeafKind::CompileScripts),
                ],
            ),
        ],
    )
}

/// `deploy = sequential(build, publish, clean)`
pub fn deploy_task() -> Task {
    Task::sequential(
        "deploy",
        vec![
            build_task(),
            Task::leaf(LeafKind::Publish),
            Task::leaf(LeafKind::Clean),
        ],
    )
}

/// A pipeline that runs a single leaf, for `sitepipe task <name>`.
pub fn single_leaf(kind: LeafKind) -> Pipeline {
    Pipeline {
        name: kind.as_str().to_string(),
        task: Task::leaf(kind),
        services: Vec::new(),
    }
}
