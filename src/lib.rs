// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod ops;
pub mod pipeline;
pub mod service;
pub mod task;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::cli::{CliArgs, Command};
use crate::config::{ConfigFile, default_config_path, load_or_default};
use crate::dag::DagGraph;
use crate::errors::Result;
use crate::ops::{LeafRunner, Leaves};
use crate::task::entry::single_leaf;
use crate::task::{EntryPoint, Pipeline};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or the built-in defaults)
/// - the pipeline selected on the command line
/// - the real leaf runner over the project root
/// - (for `dev`) the serve and watch services
pub async fn run(args: CliArgs) -> Result<()> {
    let (config_path, allow_missing) = match &args.config {
        Some(path) => (PathBuf::from(path), false),
        None => (default_config_path(), true),
    };
    let cfg = Arc::new(load_or_default(&config_path, allow_missing)?);
    let project_root = project_root_dir(&config_path);

    let (pipeline, port) = match args.command {
        Command::Build => (EntryPoint::Build.pipeline(), None),
        Command::Dev { port } => (EntryPoint::Dev.pipeline(), port),
        Command::Deploy => (EntryPoint::Deploy.pipeline(), None),
        Command::Task { leaf } => (single_leaf(leaf), None),
    };

    if args.dry_run {
        print_dry_run(&cfg, &pipeline)?;
        return Ok(());
    }

    let runner: Arc<dyn LeafRunner> = Arc::new(Leaves::real(Arc::clone(&cfg), &project_root));
    pipeline::run_pipeline(&pipeline, &cfg, &project_root, runner, port).await
}

/// Directory every route path and tool command is relative to.
///
/// - If the config path has a non-empty parent (e.g. "site/Sitepipe.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Sitepipe.toml" (parent = ""),
///   we fall back to the current working directory "."
pub fn project_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: the task tree, its execution order and routes.
fn print_dry_run(cfg: &ConfigFile, pipeline: &Pipeline) -> Result<()> {
    let graph = DagGraph::from_task(&pipeline.task)?;

    println!("sitepipe dry-run: {}", pipeline.name);
    println!("  output_root = {}", cfg.output_root().display());
    println!();

    println!("task tree:");
    for line in pipeline.task.render_tree().lines() {
        println!("  {line}");
    }
    println!();

    println!("execution order ({}):", graph.len());
    for name in graph.topological_order()? {
        let deps = graph.dependencies_of(&name);
        if deps.is_empty() {
            println!("  - {name}");
        } else {
            println!("  - {name} (after {})", deps.join(", "));
        }
    }

    if !pipeline.services.is_empty() {
        let services: Vec<String> = pipeline.services.iter().map(|s| s.to_string()).collect();
        println!();
        println!("services: {}", services.join(", "));
    }

    println!();
    println!("routes:");
    for (class, route) in cfg.routes().iter() {
        println!("  - {class}: {} -> {}", route.src, route.dest);
        if route.watch.is_some() {
            println!("      watch: {}", route.watch_pattern());
        }
        if !route.exclude.is_empty() {
            println!("      exclude: {:?}", route.exclude);
        }
        if let Some(ext) = &route.extension {
            println!("      extension: {ext}");
        }
        for step in &route.steps {
            println!("      step: {step}");
        }
        println!("      on_error: {:?}", route.on_error);
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
