// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::task::LeafKind;

/// Command-line arguments for `sitepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitepipe",
    version,
    about = "Build, serve and publish a static site through external asset tools.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Sitepipe.toml` in the current working directory, or the
    /// built-in defaults if that file does not exist.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEPIPE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate, print the task tree, but don't run anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Clean, then compile every route into the output root.
    Build,
    /// Build, then serve the output root and rebuild on change.
    Dev {
        /// Port for the dev server (overrides `[serve].port`).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Build, publish the output root, then clean up.
    Deploy,
    /// Run a single leaf: clean, markup, images, styles, scripts or publish.
    Task {
        #[arg(value_name = "LEAF")]
        leaf: LeafKind,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
