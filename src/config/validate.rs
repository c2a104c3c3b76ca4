// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use globset::Glob;
use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile, RouteConfig, RouteTable};
use crate::errors::{Result, SitepipeError};
use crate::types::AssetClass;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SitepipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let routes = RouteTable::from_partial(raw.route);
        validate_output_root(&raw.config.output_root)?;
        validate_routes(&raw.config.output_root, &routes)?;
        if let Some(dirs) = &raw.config.clean {
            validate_clean_dirs(dirs)?;
        }
        validate_serve(&raw.serve)?;
        validate_publish(&raw.publish)?;
        Ok(ConfigFile::new_unchecked(
            raw.config,
            routes,
            raw.serve,
            raw.publish,
        ))
    }
}

/// Re-run validation on an already constructed config (used by tests and
/// by callers that build configs by hand).
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    let root = cfg.config_section().output_root.as_str();
    validate_output_root(root)?;
    validate_routes(root, cfg.routes())?;
    if let Some(dirs) = &cfg.config_section().clean {
        validate_clean_dirs(dirs)?;
    }
    validate_serve(cfg.serve())?;
    validate_publish(cfg.publish())?;
    Ok(())
}

fn validate_output_root(root: &str) -> Result<()> {
    let trimmed = root.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == "./" {
        return Err(SitepipeError::ConfigError(format!(
            "[config].output_root must name a subdirectory (got {root:?})"
        )));
    }
    ensure_relative_without_parent("[config].output_root", trimmed)
}

fn validate_routes(output_root: &str, routes: &RouteTable) -> Result<()> {
    let root = normalized(output_root);
    for (class, route) in routes.iter() {
        validate_route(class, route, &root)?;
    }
    Ok(())
}

fn validate_route(class: AssetClass, route: &RouteConfig, output_root: &Path) -> Result<()> {
    if route.src.trim().is_empty() {
        return Err(SitepipeError::ConfigError(format!(
            "[route.{class}].src must not be empty"
        )));
    }

    let key = format!("[route.{class}].dest");
    ensure_relative_without_parent(&key, &route.dest)?;
    if !normalized(&route.dest).starts_with(output_root) {
        return Err(SitepipeError::ConfigError(format!(
            "{key} = {:?} is not inside output_root {:?}",
            route.dest,
            output_root.display().to_string()
        )));
    }

    let patterns = std::iter::once(route.src.as_str())
        .chain(route.watch.as_deref())
        .chain(route.exclude.iter().map(String::as_str));
    for pattern in patterns {
        Glob::new(pattern).map_err(|e| {
            SitepipeError::ConfigError(format!(
                "[route.{class}] has invalid glob {pattern:?}: {e}"
            ))
        })?;
    }

    if let Some(ext) = &route.extension {
        if ext.is_empty() || ext.contains('/') || ext.starts_with('.') {
            return Err(SitepipeError::ConfigError(format!(
                "[route.{class}].extension must be a bare extension like \"css\" (got {ext:?})"
            )));
        }
    }

    if route.steps.iter().any(|s| s.trim().is_empty()) {
        return Err(SitepipeError::ConfigError(format!(
            "[route.{class}].steps must not contain empty commands"
        )));
    }

    Ok(())
}

fn validate_clean_dirs(dirs: &[String]) -> Result<()> {
    for dir in dirs {
        let trimmed = dir.trim();
        if trimmed.is_empty() || trimmed == "." || trimmed == "./" {
            return Err(SitepipeError::ConfigError(format!(
                "[config].clean entries must name a subdirectory (got {dir:?})"
            )));
        }
        ensure_relative_without_parent("[config].clean", trimmed)?;
    }
    Ok(())
}

fn validate_serve(serve: &crate::config::ServeConfig) -> Result<()> {
    if serve.cmd.trim().is_empty() {
        return Err(SitepipeError::ConfigError(
            "[serve].cmd must not be empty".to_string(),
        ));
    }
    if let Some(pattern) = &serve.ready_on_stdout {
        Regex::new(pattern).map_err(|e| {
            SitepipeError::ConfigError(format!(
                "[serve].ready_on_stdout is not a valid regex: {e}"
            ))
        })?;
    }
    Ok(())
}

fn validate_publish(publish: &crate::config::PublishConfig) -> Result<()> {
    if publish.cmd.trim().is_empty() {
        return Err(SitepipeError::ConfigError(
            "[publish].cmd must not be empty".to_string(),
        ));
    }
    let staging = publish.staging_dir.trim();
    if !staging.is_empty() {
        ensure_relative_without_parent("[publish].staging_dir", staging)?;
    }
    Ok(())
}

/// Paths that are deleted or written to must stay inside the project.
fn ensure_relative_without_parent(key: &str, value: &str) -> Result<()> {
    let path = Path::new(value);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(SitepipeError::ConfigError(format!(
            "{key} must be a relative path inside the project (got {value:?})"
        )));
    }
    Ok(())
}

/// Drop `.` components so `./build/css` and `build/css` compare equal.
fn normalized(value: &str) -> PathBuf {
    Path::new(value.trim())
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
