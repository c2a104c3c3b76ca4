// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// - Reads TOML.
/// - Fills routes missing from the file with the built-in defaults.
/// - Checks that destinations live under the output root, that globs and
///   regexes compile, and that the clean list is safe to delete.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but falls back to the built-in configuration
/// when `path` does not exist and `allow_missing` is set.
///
/// `allow_missing` is used for the default `Sitepipe.toml`; a path the user
/// named explicitly must exist.
pub fn load_or_default(path: impl AsRef<Path>, allow_missing: bool) -> Result<ConfigFile> {
    let path = path.as_ref();
    if allow_missing && !path.exists() {
        info!(
            path = %path.display(),
            "no config file found; using built-in routes"
        );
        return Ok(ConfigFile::default());
    }
    load_and_validate(path)
}

/// Default config path: `Sitepipe.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Sitepipe.toml")
}
