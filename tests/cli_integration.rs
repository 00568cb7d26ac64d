//! CLI integration tests for Sluice.
//!
//! These tests drive the binary against small asset projects. Every external
//! tool is disabled through `.sluice/config.toml`, so processors pass files
//! through unchanged and linters and generators are skipped.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"{
  "config": { "devUrl": "http://example.test" },
  "dependencies": {
    "main.css": { "files": ["styles/a.scss", "styles/b.scss"], "main": true },
    "main.js": { "files": ["scripts/main.js"], "bower": ["jquery"] }
  },
  "bower": [
    { "name": "jquery", "files": ["bower_components/jquery/dist/jquery.js"] }
  ]
}"#;

const TOOLS_DISABLED: &str = r#"
[tools.sass]
enabled = false
[tools.autoprefixer]
enabled = false
[tools.cssnano]
enabled = false
[tools.babel]
enabled = false
[tools.uglify]
enabled = false
[tools.imagemin]
enabled = false
[tools.favicons]
enabled = false
[tools.svg-sprite]
enabled = false
[tools.eslint]
enabled = false
[tools.sass-lint]
enabled = false
"#;

/// Get the sluice binary command.
///
/// `HOME` points into the project so a user-level config cannot leak in.
fn sluice(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sluice").unwrap();
    cmd.current_dir(dir).env("HOME", dir).env_remove("SLUICE_PRODUCTION");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A project with two style sources, one script and a vendor library.
fn project(config: &str) -> TempDir {
    let tmp = temp_dir();
    let root = tmp.path();
    write(root, "assets/manifest.json", MANIFEST);
    write(root, "assets/styles/a.scss", "a { color: red; }\n");
    write(root, "assets/styles/b.scss", "b { color: blue; }\n");
    write(root, "assets/scripts/main.js", "console.log('main');\n");
    write(root, "bower_components/jquery/dist/jquery.js", "/* jquery */\n");
    write(root, "assets/fonts/icons.woff", "woff");
    write(root, "assets/images/sub/bg.png", "png");
    write(root, ".sluice/config.toml", config);
    tmp
}

// ============================================================================
// sluice tasks
// ============================================================================

#[test]
fn test_tasks_lists_builtin_graph() {
    let tmp = temp_dir();

    sluice(tmp.path())
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("styles"))
        .stdout(predicate::str::contains("lint-styles"))
        .stdout(predicate::str::contains("default"));
}

#[test]
fn test_tasks_json() {
    let tmp = temp_dir();

    let output = sluice(tmp.path())
        .args(["--message-format", "json", "tasks"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = listing
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert!(names.contains(&"wiredep"));
    assert!(names.contains(&"build"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_manifest_fails() {
    let tmp = temp_dir();

    sluice(tmp.path())
        .arg("styles")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find"))
        .stderr(predicate::str::contains("--manifest <path>"));
}

#[test]
fn test_unknown_task_fails() {
    let tmp = project(TOOLS_DISABLED);

    sluice(tmp.path())
        .args(["run", "stlyes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown task"));

    assert!(!tmp.path().join("dist").exists());
}

#[test]
fn test_malformed_manifest_fails() {
    let tmp = project(TOOLS_DISABLED);
    write(tmp.path(), "assets/manifest.json", "{ not json");

    sluice(tmp.path()).arg("styles").assert().failure();
}

// ============================================================================
// sluice styles / scripts
// ============================================================================

#[test]
fn test_styles_development() {
    let tmp = project(TOOLS_DISABLED);

    sluice(tmp.path()).arg("styles").assert().success();

    let css = fs::read_to_string(tmp.path().join("dist/styles/main.css")).unwrap();
    let a = css.find("color: red").unwrap();
    let b = css.find("color: blue").unwrap();
    assert!(a < b);
    assert!(css.contains("sourceMappingURL=main.css.map"));
    assert!(tmp.path().join("dist/styles/main.css.map").exists());
    assert!(!tmp.path().join("dist/assets.json").exists());
}

#[test]
fn test_scripts_vendor_first() {
    let tmp = project(TOOLS_DISABLED);

    sluice(tmp.path()).arg("scripts").assert().success();

    let js = fs::read_to_string(tmp.path().join("dist/scripts/main.js")).unwrap();
    assert!(js.find("jquery").unwrap() < js.find("console.log").unwrap());
}

#[test]
fn test_production_writes_revision_manifest() {
    let tmp = project(TOOLS_DISABLED);

    sluice(tmp.path())
        .args(["--production", "build"])
        .assert()
        .success();

    let ledger = fs::read_to_string(tmp.path().join("dist/assets.json")).unwrap();
    let entries: serde_json::Value = serde_json::from_str(&ledger).unwrap();
    let css = entries["styles/main.css"].as_str().unwrap();
    let js = entries["scripts/main.js"].as_str().unwrap();
    assert!(css.starts_with("styles/main-") && css.ends_with(".css"));
    assert!(js.starts_with("scripts/main-") && js.ends_with(".js"));
    assert!(tmp.path().join("dist").join(css).exists());
    assert!(!tmp.path().join("dist/styles/main.css.map").exists());
}

#[test]
fn test_production_env_var() {
    let tmp = project(TOOLS_DISABLED);

    sluice(tmp.path())
        .env("SLUICE_PRODUCTION", "true")
        .arg("styles")
        .assert()
        .success();

    assert!(tmp.path().join("dist/assets.json").exists());
}

// ============================================================================
// sluice (default) / build
// ============================================================================

#[test]
fn test_default_cleans_then_builds() {
    let tmp = project(TOOLS_DISABLED);
    write(tmp.path(), "dist/stale.txt", "stale");

    sluice(tmp.path()).assert().success();

    assert!(!tmp.path().join("dist/stale.txt").exists());
    assert!(tmp.path().join("dist/styles/main.css").exists());
    assert!(tmp.path().join("dist/scripts/main.js").exists());
    assert!(tmp.path().join("dist/fonts/icons.woff").exists());
    assert!(tmp.path().join("dist/images/sub/bg.png").exists());
}

#[test]
fn test_build_json_messages() {
    let tmp = project(TOOLS_DISABLED);

    sluice(tmp.path())
        .args(["--message-format", "json", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reason\":\"build-finished\""))
        .stdout(predicate::str::contains("\"reason\":\"asset-changed\""));
}

#[test]
fn test_wiredep_alias() {
    let tmp = project(TOOLS_DISABLED);
    write(tmp.path(), "bower_components/normalize/normalize.css", "html {}\n");
    write(
        tmp.path(),
        "assets/manifest.json",
        r#"{
  "dependencies": { "main.css": { "files": ["styles/a.scss"] } },
  "bower": [ { "name": "normalize", "files": ["bower_components/normalize/normalize.css"] } ]
}"#,
    );
    write(tmp.path(), "assets/styles/a.scss", "// bower:css\n// endbower\n");

    sluice(tmp.path()).args(["run", "inject"]).assert().success();

    let scss = fs::read_to_string(tmp.path().join("assets/styles/a.scss")).unwrap();
    assert!(scss.contains("@import \"../../bower_components/normalize/normalize.css\";"));
}

// ============================================================================
// Failure policy
// ============================================================================

#[cfg(unix)]
const CSSNANO_FAILS: &str = r#"
[tools.sass]
enabled = false
[tools.autoprefixer]
enabled = false
[tools.cssnano]
command = "false"
args = []
[tools.eslint]
enabled = false
[tools.sass-lint]
enabled = false
"#;

#[cfg(unix)]
#[test]
fn test_tool_failure_tolerated_in_development() {
    let tmp = project(CSSNANO_FAILS);

    sluice(tmp.path()).arg("styles").assert().success();

    assert!(!tmp.path().join("dist/styles/main.css").exists());
}

#[cfg(unix)]
#[test]
fn test_tool_failure_fatal_in_production() {
    let tmp = project(CSSNANO_FAILS);

    sluice(tmp.path())
        .args(["--production", "styles"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cssnano"));

    assert!(!tmp.path().join("dist/assets.json").exists());
}

// ============================================================================
// sluice completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    sluice(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sluice"));
}
