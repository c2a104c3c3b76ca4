// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::defaults;
use crate::types::{AssetClass, OnError};

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// output_root = "build"
///
/// [route.styles]
/// src = "src/scss/style.scss"
/// watch = "src/scss/**/*.scss"
/// dest = "build/css"
/// extension = "css"
/// on_error = "warn"
/// steps = ["npx sass --stdin", "npx csso"]
///
/// [serve]
/// cmd = "npx live-server {root} --port={port}"
///
/// [publish]
/// cmd = "npx gh-pages -d {root}"
/// ```
///
/// Every section is optional. Routes missing from `[route.*]` are filled
/// from the built-in defaults when the file is validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub route: BTreeMap<AssetClass, RouteConfig>,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub publish: PublishConfig,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// The single build output root every route destination lives under.
    #[serde(default = "default_output_root")]
    pub output_root: String,

    /// Directories removed by the `clean` leaf.
    ///
    /// If `None`, this is the output root plus the publish staging dir.
    #[serde(default)]
    pub clean: Option<Vec<String>>,
}

fn default_output_root() -> String {
    defaults::OUTPUT_ROOT.to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            clean: None,
        }
    }
}

/// `[route.<class>]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Glob selecting the files this route compiles.
    pub src: String,

    /// Glob observed by the watch service. Defaults to `src`.
    #[serde(default)]
    pub watch: Option<String>,

    /// Globs removed from both `src` and `watch` matches.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Destination directory (descendant of the output root).
    pub dest: String,

    /// Extension given to output files, e.g. `"css"`. Keeps the source
    /// extension if unset.
    #[serde(default)]
    pub extension: Option<String>,

    /// Ordered transform stages. Each is a shell command reading the file on
    /// stdin and writing the transformed file to stdout. No stages = copy.
    #[serde(default)]
    pub steps: Vec<String>,

    #[serde(default)]
    pub on_error: OnError,
}

impl RouteConfig {
    /// Effective watch glob.
    pub fn watch_pattern(&self) -> &str {
        self.watch.as_deref().unwrap_or(&self.src)
    }
}

/// `[serve]` section: the external live-reload server.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Command line; `{root}` and `{port}` are substituted.
    #[serde(default = "default_serve_cmd")]
    pub cmd: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Regex matched against server stdout to log that it is ready.
    #[serde(default = "default_ready_on_stdout")]
    pub ready_on_stdout: Option<String>,
}

fn default_serve_cmd() -> String {
    defaults::SERVE_CMD.to_string()
}

fn default_port() -> u16 {
    defaults::SERVE_PORT
}

fn default_ready_on_stdout() -> Option<String> {
    Some(defaults::SERVE_READY.to_string())
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            cmd: default_serve_cmd(),
            port: default_port(),
            ready_on_stdout: default_ready_on_stdout(),
        }
    }
}

/// `[publish]` section: the external static-hosting publisher.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    /// Command line; `{root}` and `{staging}` are substituted.
    #[serde(default = "default_publish_cmd")]
    pub cmd: String,

    /// Local staging directory the publisher may create. An empty string
    /// means none.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
}

fn default_publish_cmd() -> String {
    defaults::PUBLISH_CMD.to_string()
}

fn default_staging_dir() -> String {
    defaults::STAGING_DIR.to_string()
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            cmd: default_publish_cmd(),
            staging_dir: default_staging_dir(),
        }
    }
}

/// The four routes, one per asset class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub markup: RouteConfig,
    pub images: RouteConfig,
    pub styles: RouteConfig,
    pub scripts: RouteConfig,
}

impl RouteTable {
    pub fn get(&self, class: AssetClass) -> &RouteConfig {
        match class {
            AssetClass::Markup => &self.markup,
            AssetClass::Images => &self.images,
            AssetClass::Styles => &self.styles,
            AssetClass::Scripts => &self.scripts,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, &RouteConfig)> {
        AssetClass::ALL.into_iter().map(move |class| (class, self.get(class)))
    }

    /// Build a table from configured routes, filling gaps from the defaults.
    pub fn from_partial(mut routes: BTreeMap<AssetClass, RouteConfig>) -> Self {
        let mut take = |class: AssetClass| {
            routes
                .remove(&class)
                .unwrap_or_else(|| defaults::default_route(class))
        };
        Self {
            markup: take(AssetClass::Markup),
            images: take(AssetClass::Images),
            styles: take(AssetClass::Styles),
            scripts: take(AssetClass::Scripts),
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::from_partial(BTreeMap::new())
    }
}

/// Validated configuration, built once at startup and shared by reference.
///
/// Construct via [`ConfigFile::try_from`] (or the loader helpers) so the
/// invariants in `validate.rs` hold.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    routes: RouteTable,
    serve: ServeConfig,
    publish: PublishConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        routes: RouteTable,
        serve: ServeConfig,
        publish: PublishConfig,
    ) -> Self {
        Self {
            config,
            routes,
            serve,
            publish,
        }
    }

    pub fn output_root(&self) -> &Path {
        Path::new(&self.config.output_root)
    }

    pub fn config_section(&self) -> &ConfigSection {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn route(&self, class: AssetClass) -> &RouteConfig {
        self.routes.get(class)
    }

    pub fn serve(&self) -> &ServeConfig {
        &self.serve
    }

    pub fn publish(&self) -> &PublishConfig {
        &self.publish
    }

    /// Publish staging dir, if any.
    pub fn staging_dir(&self) -> Option<&Path> {
        let dir = self.publish.staging_dir.trim();
        if dir.is_empty() {
            None
        } else {
            Some(Path::new(dir))
        }
    }

    /// Directories the `clean` leaf removes, relative to the project root.
    pub fn clean_dirs(&self) -> Vec<PathBuf> {
        match &self.config.clean {
            Some(dirs) => dirs.iter().map(PathBuf::from).collect(),
            None => {
                let mut dirs = vec![self.output_root().to_path_buf()];
                dirs.extend(self.staging_dir().map(Path::to_path_buf));
                dirs
            }
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            ConfigSection::default(),
            RouteTable::default(),
            ServeConfig::default(),
            PublishConfig::default(),
        )
    }
}
