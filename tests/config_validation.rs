// tests/config_validation.rs

mod common;
use crate::common::{ProjectBuilder, TestResult};

use std::io::Write;

use tempfile::{NamedTempFile, tempdir};

use shadowpack::config::load_and_validate;
use shadowpack::errors::BuildError;
use shadowpack::types::{FailurePolicy, SpecFlavor, WatermarkPolicy};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn expect_config_error(contents: &str, needle: &str) {
    let file = config_file(contents);
    match load_and_validate(file.path()) {
        Err(BuildError::Configuration(msg)) => {
            assert!(msg.contains(needle), "unexpected message: {msg}");
        }
        other => panic!("expected configuration error containing {needle:?}, got {other:?}"),
    }
}

#[test]
fn minimal_project_gets_defaults() -> TestResult {
    let file = config_file(
        r#"
[project]
name = "myapp"
"#,
    );
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.project.name, "myapp");
    assert_eq!(cfg.concurrency, 100);
    assert_eq!(cfg.spec_flavor, SpecFlavor::Jasmine);
    assert_eq!(cfg.watermark_policy, WatermarkPolicy::Advance);
    assert!(cfg.platform_compile.is_none());
    assert!(cfg.script_matcher.is_match("app.js"));
    assert!(cfg.script_matcher.is_match("ui/view.js"));
    assert!(!cfg.script_matcher.is_match("images/logo.png"));
    assert!(cfg.spec_matcher.is_match("spec/app_spec.js"));
    assert!(!cfg.spec_matcher.is_match("ui/view.js"));
    Ok(())
}

#[test]
fn full_project_file_parses() -> TestResult {
    let file = config_file(
        r#"
[project]
name = "myapp"
resources = "app/Resources"

[build]
concurrency = 8
spec_flavor = "mocha-chai"
watermark_policy = "hold"

[platform_compile]
platforms = ["android", "ios"]

[transform]
command = "uglifyjs"
args = ["{file}"]

[lint]
command = "jshint"
"#,
    );
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.concurrency, 8);
    assert_eq!(cfg.spec_flavor, SpecFlavor::MochaChai);
    assert_eq!(cfg.watermark_policy, WatermarkPolicy::Hold);

    let pc = cfg.platform_compile.as_ref().unwrap();
    assert_eq!(pc.platforms, vec!["android", "ios"]);
    assert_eq!(pc.command, "alloy");
    assert!(pc.args.iter().any(|a| a == "{platform}"));
    assert_eq!(pc.slots.get("ios").map(String::as_str), Some("iphone"));

    assert_eq!(cfg.transform.as_ref().unwrap().command, "uglifyjs");
    assert_eq!(cfg.lint.as_ref().unwrap().args, vec!["{path}"]);
    Ok(())
}

#[test]
fn zero_concurrency_is_rejected() {
    expect_config_error(
        r#"
[project]
name = "myapp"

[build]
concurrency = 0
"#,
        "concurrency",
    );
}

#[test]
fn empty_or_path_like_names_are_rejected() {
    expect_config_error("[project]\nname = \"  \"\n", "must not be empty");
    expect_config_error("[project]\nname = \"a/b\"\n", "path separators");
}

#[test]
fn unknown_flavor_and_policy_are_rejected() {
    expect_config_error(
        "[project]\nname = \"x\"\n[build]\nspec_flavor = \"tap\"\n",
        "invalid spec flavor",
    );
    expect_config_error(
        "[project]\nname = \"x\"\n[build]\nwatermark_policy = \"sometimes\"\n",
        "invalid watermark_policy",
    );
}

#[test]
fn compile_args_without_platform_placeholder_are_rejected() {
    expect_config_error(
        r#"
[project]
name = "x"

[platform_compile]
args = ["compile"]
"#,
        "{platform}",
    );
}

#[test]
fn invalid_glob_is_rejected() {
    expect_config_error(
        "[project]\nname = \"x\"\n[build]\nscript_pattern = \"**/[.js\"\n",
        "script_pattern",
    );
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = config_file("[project\nname = 1");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(BuildError::Toml(_))
    ));
}

#[test]
fn missing_project_file_is_a_filesystem_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("Shadowpack.toml");
    match load_and_validate(&missing) {
        Err(BuildError::Filesystem { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected filesystem error, got {other:?}"),
    }
}

#[test]
fn settings_resolve_paths_and_policies() {
    let dir = tempdir().unwrap();
    let settings = ProjectBuilder::new("myapp")
        .watching(true)
        .flavor_override(SpecFlavor::MochaShould)
        .settings(dir.path());

    assert_eq!(settings.paths.resources, dir.path().join("Resources"));
    assert_eq!(settings.failure_policy, FailurePolicy::LogAndContinue);
    assert_eq!(settings.spec_flavor, SpecFlavor::MochaShould);
    assert!(
        settings
            .layout
            .bundle_file
            .ends_with("build/shadowpack/dist/myapp.zip")
    );
    assert!(settings.layout.sentinel.ends_with("build/last_updated"));
    assert!(settings.layout.spec_root.ends_with("shadowpack/src/spec"));
}

#[test]
fn one_shot_builds_abort_on_transform_errors() {
    let dir = tempdir().unwrap();
    let settings = ProjectBuilder::new("myapp").settings(dir.path());
    assert_eq!(settings.failure_policy, FailurePolicy::Abort);
}

#[test]
fn cli_platforms_override_project_platforms() {
    let dir = tempdir().unwrap();
    let settings = ProjectBuilder::new("myapp")
        .platform_compile(&["android"])
        .platforms(&["ios", "mobileweb"])
        .settings(dir.path());

    let pc = settings.platform_compile.as_ref().unwrap();
    assert_eq!(pc.platforms, vec!["ios", "mobileweb"]);
    assert!(
        pc.slot_dir(&settings.paths.resources, "ios")
            .ends_with("Resources/iphone/alloy")
    );
    assert!(
        pc.slot_dir(&settings.paths.resources, "android")
            .ends_with("Resources/android/alloy")
    );
}

#[test]
fn platform_compile_without_targets_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    let result = ProjectBuilder::new("myapp")
        .platform_compile(&[])
        .try_settings(dir.path());
    assert!(matches!(result, Err(BuildError::Configuration(_))));
}

#[test]
fn lint_without_section_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    let result = ProjectBuilder::new("myapp")
        .request_lint(true)
        .try_settings(dir.path());
    match result {
        Err(BuildError::Configuration(msg)) => assert!(msg.contains("[lint]")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}
