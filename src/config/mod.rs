// src/config/mod.rs

//! Configuration loading and validation for sitepipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Provide the built-in route table and tool commands (`defaults.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate invariants like "every destination lives under the output
//!   root" (`validate.rs`).

pub mod defaults;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, ConfigSection, PublishConfig, RawConfigFile, RouteConfig, RouteTable, ServeConfig,
};
