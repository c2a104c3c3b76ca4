#![allow(dead_code)]

use std::collections::BTreeMap;

use sitepipe::config::{
    ConfigFile, ConfigSection, PublishConfig, RawConfigFile, RouteConfig, ServeConfig,
};
use sitepipe::errors::Result;
use sitepipe::types::{AssetClass, OnError};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Routes not set explicitly fall back to the built-in defaults, exactly as
/// a partial `Sitepipe.toml` would.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                route: BTreeMap::new(),
                serve: ServeConfig::default(),
                publish: PublishConfig::default(),
            },
        }
    }

    pub fn output_root(mut self, root: &str) -> Self {
        self.config.config.output_root = root.to_string();
        self
    }

    pub fn clean(mut self, dirs: &[&str]) -> Self {
        self.config.config.clean = Some(dirs.iter().map(|d| d.to_string()).collect());
        self
    }

    pub fn with_route(mut self, class: AssetClass, route: RouteConfig) -> Self {
        self.config.route.insert(class, route);
        self
    }

    pub fn serve_cmd(mut self, cmd: &str) -> Self {
        self.config.serve.cmd = cmd.to_string();
        self
    }

    pub fn publish_cmd(mut self, cmd: &str) -> Self {
        self.config.publish.cmd = cmd.to_string();
        self
    }

    pub fn staging_dir(mut self, dir: &str) -> Self {
        self.config.publish.staging_dir = dir.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RouteConfig`.
pub struct RouteConfigBuilder {
    route: RouteConfig,
}

impl RouteConfigBuilder {
    pub fn new(src: &str, dest: &str) -> Self {
        Self {
            route: RouteConfig {
                src: src.to_string(),
                watch: None,
                exclude: vec![],
                dest: dest.to_string(),
                extension: None,
                steps: vec![],
                on_error: OnError::Fail,
            },
        }
    }

    pub fn watch(mut self, pattern: &str) -> Self {
        self.route.watch = Some(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.route.exclude.push(pattern.to_string());
        self
    }

    pub fn extension(mut self, ext: &str) -> Self {
        self.route.extension = Some(ext.to_string());
        self
    }

    pub fn step(mut self, cmd: &str) -> Self {
        self.route.steps.push(cmd.to_string());
        self
    }

    pub fn on_error(mut self, on_error: OnError) -> Self {
        self.route.on_error = on_error;
        self
    }

    pub fn build(self) -> RouteConfig {
        self.route
    }
}

/// A config whose four routes only use `cat`/`tr`, so a full build runs
/// without any node tooling. Output root is `build`.
pub fn shell_only_config() -> ConfigFileBuilder {
    ConfigFileBuilder::new()
        .with_route(
            AssetClass::Markup,
            RouteConfigBuilder::new("src/*.pug", "build")
                .watch("src/**/*.pug")
                .extension("html")
                .step("tr a-z A-Z")
                .build(),
        )
        .with_route(
            AssetClass::Images,
            RouteConfigBuilder::new("src/img/*", "build/img").build(),
        )
        .with_route(
            AssetClass::Styles,
            RouteConfigBuilder::new("src/scss/style.scss", "build/css")
                .watch("src/scss/**/*.scss")
                .extension("css")
                .step("cat")
                .on_error(OnError::Warn)
                .build(),
        )
        .with_route(
            AssetClass::Scripts,
            RouteConfigBuilder::new("src/js/main.js", "build/js")
                .watch("src/js/**/*.js")
                .extension("js")
                .step("cat {src}")
                .build(),
        )
        .staging_dir("")
}
