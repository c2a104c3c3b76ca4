// tests/config_loading.rs

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use sitepipe::config::defaults::default_route;
use sitepipe::config::validate::validate_config;
use sitepipe::config::{ConfigFile, load_and_validate, load_or_default};
use sitepipe::errors::SitepipeError;
use sitepipe::types::{AssetClass, OnError};
use sitepipe_test_utils::builders::{ConfigFileBuilder, RouteConfigBuilder};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn expect_config_error(contents: &str, needle: &str) {
    let file = config_file(contents);
    match load_and_validate(file.path()) {
        Err(SitepipeError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} should mention {needle:?}")
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn defaults_cover_every_route() {
    let cfg = ConfigFile::default();

    assert_eq!(cfg.output_root(), Path::new("build"));
    for class in AssetClass::ALL {
        assert_eq!(cfg.route(class), &default_route(class));
        assert!(cfg.route(class).dest.starts_with("build"));
    }
    assert_eq!(cfg.route(AssetClass::Styles).on_error, OnError::Warn);
    assert_eq!(cfg.route(AssetClass::Scripts).on_error, OnError::Fail);
    assert_eq!(
        cfg.clean_dirs(),
        vec![PathBuf::from("build"), PathBuf::from(".publish")]
    );
    validate_config(&cfg).unwrap();
}

#[test]
fn partial_file_keeps_default_routes() {
    let file = config_file(
        r#"
[route.styles]
src = "assets/css/*.scss"
dest = "build/styles"
extension = "css"
steps = ["npx sass --stdin"]
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();

    let styles = cfg.route(AssetClass::Styles);
    assert_eq!(styles.src, "assets/css/*.scss");
    assert_eq!(styles.watch_pattern(), "assets/css/*.scss");
    assert_eq!(styles.on_error, OnError::Fail);
    assert_eq!(cfg.route(AssetClass::Markup), &default_route(AssetClass::Markup));
}

#[test]
fn changing_output_root_requires_overriding_routes() {
    let file = config_file(
        r#"
[config]
output_root = "public"
clean = ["public"]

[route.markup]
src = "pages/*.pug"
watch = "pages/**/*.pug"
exclude = ["pages/_*.pug"]
dest = "public"
extension = "html"
steps = ["npx pug --path {src}"]

[serve]
cmd = "python3 -m http.server {port} -d {root}"
port = 9000
ready_on_stdout = "Serving HTTP"

[publish]
cmd = "rsync -a {root}/ host:/srv/site"
staging_dir = ""
"#,
    );
    let cfg = load_and_validate(file.path());
    // Default routes still write under `build`, which is outside `public`.
    assert!(matches!(cfg, Err(SitepipeError::ConfigError(_))));
}

#[test]
fn custom_output_root_with_all_routes() {
    let mut toml = String::from("[config]\noutput_root = \"public\"\n");
    for class in ["markup", "images", "styles", "scripts"] {
        toml.push_str(&format!(
            "\n[route.{class}]\nsrc = \"src/{class}/*\"\ndest = \"public/{class}\"\n"
        ));
    }
    toml.push_str("\n[serve]\nport = 9000\n\n[publish]\nstaging_dir = \"\"\n");

    let file = config_file(&toml);
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.output_root(), Path::new("public"));
    assert_eq!(cfg.serve().port, 9000);
    assert_eq!(cfg.staging_dir(), None);
    assert_eq!(cfg.clean_dirs(), vec![PathBuf::from("public")]);
    assert!(cfg.route(AssetClass::Images).steps.is_empty());
}

#[test]
fn dest_outside_output_root_is_rejected() {
    expect_config_error(
        r#"
[route.images]
src = "src/img/*"
dest = "dist/img"
"#,
        "not inside output_root",
    );
}

#[test]
fn dest_escaping_project_is_rejected() {
    expect_config_error(
        r#"
[route.images]
src = "src/img/*"
dest = "build/../../img"
"#,
        "relative path inside the project",
    );
}

#[test]
fn invalid_glob_is_rejected() {
    expect_config_error(
        r#"
[route.scripts]
src = "src/js/[main.js"
dest = "build/js"
"#,
        "invalid glob",
    );
}

#[test]
fn dotted_extension_is_rejected() {
    expect_config_error(
        r#"
[route.styles]
src = "src/scss/style.scss"
dest = "build/css"
extension = ".css"
"#,
        "bare extension",
    );
}

#[test]
fn unsafe_clean_entry_is_rejected() {
    expect_config_error("[config]\nclean = [\".\"]\n", "must name a subdirectory");
    expect_config_error("[config]\nclean = [\"/tmp\"]\n", "relative path");
}

#[test]
fn bad_ready_regex_is_rejected() {
    expect_config_error("[serve]\nready_on_stdout = \"(\"\n", "ready_on_stdout");
}

#[test]
fn unknown_keys_are_toml_errors() {
    let file = config_file("[config]\noutput_rot = \"build\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(SitepipeError::TomlError(_))
    ));
}

#[test]
fn unknown_route_class_is_a_toml_error() {
    let file = config_file("[route.fonts]\nsrc = \"a\"\ndest = \"build\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(SitepipeError::TomlError(_))
    ));
}

#[test]
fn missing_default_file_falls_back_to_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Sitepipe.toml");

    let cfg = load_or_default(&path, true).unwrap();
    assert_eq!(cfg.output_root(), Path::new("build"));

    assert!(matches!(
        load_or_default(&path, false),
        Err(SitepipeError::IoError(_))
    ));
}

#[test]
fn builder_validates_like_the_loader() {
    let err = ConfigFileBuilder::new()
        .with_route(
            AssetClass::Markup,
            RouteConfigBuilder::new("src/*.pug", "build").step("  ").build(),
        )
        .try_build()
        .unwrap_err();
    assert!(err.to_string().contains("empty commands"));
}
