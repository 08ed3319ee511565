//! CLI integration tests for glslang-recipe.
//!
//! These tests exercise every command that works without network access
//! or a CMake installation.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the glslang-recipe binary command, isolated from the user's config.
fn recipe(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("glslang-recipe").unwrap();
    cmd.current_dir(dir)
        .env("GLSLANG_RECIPE_HOME", dir.join("home"))
        .arg("--no-color");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn linux() -> [&'static str; 4] {
    ["--os", "Linux", "--compiler", "gcc"]
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// glslang-recipe options
// ============================================================================

#[test]
fn test_options_lists_every_option() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .arg("options")
        .assert()
        .success()
        .stdout(predicate::str::contains("shared"))
        .stdout(predicate::str::contains("fPIC"))
        .stdout(predicate::str::contains("build_executables"))
        .stdout(predicate::str::contains("spv_remapper"))
        .stdout(predicate::str::contains("hlsl"))
        .stdout(predicate::str::contains("enable_optimizer"))
        .stdout(predicate::str::contains("True|False"));
}

// ============================================================================
// glslang-recipe validate
// ============================================================================

#[test]
fn test_validate_linux_defaults() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .arg("validate")
        .args(linux())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration valid for Linux"))
        .stdout(predicate::str::contains("Requires: spirv-tools"));
}

#[test]
fn test_validate_json_drops_fpic_on_windows() {
    let tmp = temp_dir();

    let json = stdout_json(
        recipe(tmp.path())
            .args(["validate", "--format", "json", "--os", "Windows"])
            .args(["--compiler", "msvc", "-o", "fPIC=true"]),
    );
    assert!(json["fPIC"].is_null());
    assert_eq!(json["shared"], false);
    assert_eq!(json["requirements"][0], "spirv-tools");
}

#[test]
fn test_validate_rejects_shared_on_windows() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["validate", "--os", "Windows", "--compiler", "msvc"])
        .args(["-o", "shared=True"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "unsupported configuration for Windows",
        ))
        .stderr(predicate::str::contains("shared=false"));
}

#[test]
fn test_validate_rejects_old_cppstd() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .arg("validate")
        .args(linux())
        .args(["--cppstd", "98"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too old for glslang"))
        .stderr(predicate::str::contains("--cppstd 11"));
}

#[test]
fn test_unknown_option_fails() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .arg("validate")
        .args(linux())
        .args(["-o", "with_tests=true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown option `with_tests`"))
        .stderr(predicate::str::contains("glslang-recipe options"));
}

#[test]
fn test_invalid_option_value_fails() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .arg("validate")
        .args(linux())
        .args(["-o", "hlsl=maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value `maybe`"));
}

// ============================================================================
// glslang-recipe flags
// ============================================================================

#[test]
fn test_flags_follow_options() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .arg("flags")
        .args(linux())
        .args(["-o", "hlsl=false", "-o", "enable_optimizer=false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-DENABLE_HLSL=OFF"))
        .stdout(predicate::str::contains("-DENABLE_OPT=OFF"))
        .stdout(predicate::str::contains("-DCMAKE_POSITION_INDEPENDENT_CODE=ON"))
        .stdout(predicate::str::contains("ALLOW_EXTERNAL_SPIRV_TOOLS").not());
}

#[test]
fn test_flags_json() {
    let tmp = temp_dir();

    let json = stdout_json(
        recipe(tmp.path())
            .args(["flags", "--format", "json"])
            .args(linux())
            .args(["-o", "shared=true"]),
    );
    assert_eq!(json["BUILD_SHARED_LIBS"], true);
    assert!(json.get("CMAKE_POSITION_INDEPENDENT_CODE").is_none());
    assert_eq!(json["ALLOW_EXTERNAL_SPIRV_TOOLS"], true);
}

// ============================================================================
// glslang-recipe describe
// ============================================================================

#[test]
fn test_describe_linux_debug_json() {
    let tmp = temp_dir();

    let json = stdout_json(
        recipe(tmp.path())
            .args(["describe", "--format", "json", "--build-type", "Debug"])
            .args(linux())
            .args(["--package-dir", "/opt/glslang"]),
    );

    let components = json["components"].as_array().unwrap();
    assert_eq!(components.len(), 8);

    let spirv = components.iter().find(|c| c["id"] == "spirv").unwrap();
    assert_eq!(spirv["libs"][0], "SPIRV");
    assert_eq!(spirv["defines"][0], "ENABLE_OPT");
    assert_eq!(spirv["requires"][1], "spirv-tools::spirv-tools-opt");

    let core = components.iter().find(|c| c["id"] == "core").unwrap();
    assert_eq!(core["defines"][0], "ENABLE_HLSL");
    assert_eq!(core["system_libs"][0], "m");

    assert_eq!(json["version"], "11.7.0");
    assert!(json["executable_path"]
        .as_str()
        .unwrap()
        .ends_with("bin"));
}

#[test]
fn test_describe_default_executable_path_is_absolute() {
    let tmp = temp_dir();

    let json = stdout_json(
        recipe(tmp.path())
            .args(["describe", "--format", "json"])
            .args(linux()),
    );
    let path = Path::new(json["executable_path"].as_str().unwrap());
    assert!(path.is_absolute());
    assert!(path.ends_with("build-glslang/package/bin"));
}

#[test]
fn test_describe_windows_debug_decorates_names() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["describe", "--os", "Windows", "--compiler", "msvc"])
        .args(["--build-type", "Debug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("libs: SPIRVd"))
        .stdout(predicate::str::contains("files: SPIRVd.lib"));
}

#[test]
fn test_describe_toml() {
    let tmp = temp_dir();

    let output = recipe(tmp.path())
        .args(["describe", "--format", "toml"])
        .args(linux())
        .args(["-o", "spv_remapper=false"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: toml::Value = toml::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(parsed["name"].as_str(), Some("glslang"));
    assert_eq!(parsed["components"].as_array().unwrap().len(), 7);
}

#[test]
fn test_project_config_sets_defaults_and_cli_overrides() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("recipe.toml"),
        r#"
[source]
rev = "12.0.0"

[options]
hlsl = false

[platform]
os = "Linux"
compiler = "clang"
"#,
    )
    .unwrap();

    let json = stdout_json(recipe(tmp.path()).args(["describe", "--format", "json"]));
    assert_eq!(json["version"], "12.0.0");
    assert!(json["components"]
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["id"] != "hlsl"));

    let json = stdout_json(
        recipe(tmp.path()).args(["describe", "--format", "json", "-o", "hlsl=true"]),
    );
    assert!(json["components"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["id"] == "hlsl"));
}

#[test]
fn test_global_config_is_overridden_by_project() {
    let tmp = temp_dir();
    let home = tmp.path().join("home");
    fs::create_dir_all(&home).unwrap();
    fs::write(
        home.join("config.toml"),
        "[platform]\nos = \"Windows\"\ncompiler = \"msvc\"\nbuild_type = \"Debug\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("recipe.toml"), "[platform]\nos = \"Linux\"\n").unwrap();

    let json = stdout_json(recipe(tmp.path()).args(["describe", "--format", "json"]));
    assert_eq!(json["os"], "Linux");
    assert_eq!(json["build_type"], "Debug");
}

// ============================================================================
// glslang-recipe verify
// ============================================================================

#[test]
fn test_verify_complete_package() {
    let tmp = temp_dir();
    let lib = tmp.path().join("pkg").join("lib");
    fs::create_dir_all(&lib).unwrap();
    for name in [
        "glslang",
        "GenericCodeGen",
        "MachineIndependent",
        "OGLCompiler",
        "OSDependent",
        "SPIRV",
    ] {
        fs::write(lib.join(format!("lib{}.a", name)), "").unwrap();
    }

    recipe(tmp.path())
        .args(["verify", "--package-dir", "pkg"])
        .args(linux())
        .args(["-o", "hlsl=false", "-o", "spv_remapper=false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Result: PASSED (6/6 libraries found)"));
}

#[test]
fn test_verify_reports_missing_libraries() {
    let tmp = temp_dir();
    fs::create_dir_all(tmp.path().join("pkg").join("lib")).unwrap();

    recipe(tmp.path())
        .args(["verify", "--package-dir", "pkg"])
        .args(linux())
        .assert()
        .failure()
        .stdout(predicate::str::contains("[MISSING] libSPIRV.a (spirv)"))
        .stderr(predicate::str::contains("8 of 8 libraries missing"));
}

// ============================================================================
// glslang-recipe completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("glslang-recipe"));
}
