// src/config/defaults.rs

//! Built-in route table and tool commands.
//!
//! These mirror a conventional pug / scss / browserify project:
//!
//! ```text
//! src/*.pug            -> build/*.html
//! src/img/*            -> build/img/
//! src/scss/style.scss  -> build/css/style.css
//! src/js/main.js       -> build/js/main.js
//! ```

use crate::config::model::RouteConfig;
use crate::types::{AssetClass, OnError};

pub const OUTPUT_ROOT: &str = "build";
pub const STAGING_DIR: &str = ".publish";

pub const SERVE_CMD: &str = "npx live-server {root} --port={port}";
pub const SERVE_PORT: u16 = 8000;
pub const SERVE_READY: &str = "Serving";

pub const PUBLISH_CMD: &str = "CACHE_DIR={staging} npx gh-pages -d {root}";

pub fn default_route(class: AssetClass) -> RouteConfig {
    match class {
        AssetClass::Markup => RouteConfig {
            src: "src/*.pug".to_string(),
            watch: Some("src/**/*.pug".to_string()),
            exclude: Vec::new(),
            dest: OUTPUT_ROOT.to_string(),
            extension: Some("html".to_string()),
            steps: vec!["npx pug --path {src}".to_string()],
            on_error: OnError::Fail,
        },
        AssetClass::Images => RouteConfig {
            src: "src/img/*".to_string(),
            watch: None,
            exclude: Vec::new(),
            dest: format!("{OUTPUT_ROOT}/img"),
            extension: None,
            steps: vec!["npx imagemin".to_string()],
            on_error: OnError::Fail,
        },
        AssetClass::Styles => RouteConfig {
            src: "src/scss/style.scss".to_string(),
            watch: Some("src/scss/**/*.scss".to_string()),
            exclude: Vec::new(),
            dest: format!("{OUTPUT_ROOT}/css"),
            extension: Some("css".to_string()),
            steps: vec![
                "npx sass --stdin --load-path=src/scss".to_string(),
                "npx postcss --use autoprefixer".to_string(),
                "npx csso".to_string(),
            ],
            on_error: OnError::Warn,
        },
        AssetClass::Scripts => RouteConfig {
            src: "src/js/main.js".to_string(),
            watch: Some("src/js/**/*.js".to_string()),
            exclude: Vec::new(),
            dest: format!("{OUTPUT_ROOT}/js"),
            extension: Some("js".to_string()),
            steps: vec![
                "npx browserify {src} -t [ babelify --presets [ @babel/preset-env ] ]".to_string(),
                "npx uglifyjs --compress --mangle".to_string(),
            ],
            on_error: OnError::Fail,
        },
    }
}
