//! Runs the `declsynth` binary against the weather demo graph.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn demo(file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../demos/weather")
        .join(file)
}

/// A command isolated from any config file on the host.
fn declsynth(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("declsynth").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("DECLSYNTH_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn markers_lists_the_vocabulary() {
    let home = TempDir::new().unwrap();
    declsynth(&home)
        .arg("markers")
        .assert()
        .success()
        .stdout(predicate::str::contains("ContentType"))
        .stdout(predicate::str::contains(
            "com.seriouslyhypersonic.annotations.ContentValue",
        ))
        .stdout(predicate::str::contains("enum class, sealed class, sealed interface"));
}

#[test]
fn check_reports_units_without_writing() {
    let home = TempDir::new().unwrap();
    declsynth(&home)
        .args(["check", "--input"])
        .arg(demo("graph.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("demo/weather/data/LocationContract.kt"))
        .stdout(predicate::str::contains("demo/casedetection/DeviceCaseDetection.kt"))
        .stdout(predicate::str::contains("4 unit(s) in 2 round(s) would be generated"));

    let leftovers = std::fs::read_dir(home.path()).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[test]
fn check_emits_a_json_report() {
    let home = TempDir::new().unwrap();
    let output = declsynth(&home)
        .args(["--format", "json", "check", "--input"])
        .arg(demo("graph.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["rounds"], 2);
    assert_eq!(report["summary"]["emitted"]["case-detection"], 2);
    let units = report["units"].as_array().unwrap();
    assert_eq!(units.len(), 4);
    assert!(units
        .iter()
        .any(|u| u["path"] == "demo/weather/ui/WeatherViewModelContract.kt"
            && u["originating"][0] == "demo.weather.ui.WeatherViewModel"));
}

#[test]
fn generate_writes_units_and_manifest() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("generated");
    declsynth(&home)
        .arg("--config")
        .arg(demo("declsynth.toml"))
        .args(["generate", "--input"])
        .arg(demo("graph.json"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 written, 0 up to date"));

    let contract =
        std::fs::read_to_string(out.join("demo/weather/data/LocationContract.kt")).unwrap();
    assert!(contract.contains("public const val NAME: String = \"LOCATION_NAME\"\n"));
    assert!(contract.contains("public const val CODE: Int = 1\n"));
    let controller =
        std::fs::read_to_string(out.join("demo/weather/ui/WeatherViewModelContract.kt")).unwrap();
    assert!(controller.contains("public val temperature: Double?\n"));
    assert!(!controller.contains("toString"));

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.join("declsynth-manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["units"].as_array().unwrap().len(), 4);

    // A second run over unchanged input leaves every file alone.
    declsynth(&home)
        .args(["generate", "--input"])
        .arg(demo("graph.json"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 written, 4 up to date"));
}

#[test]
fn generate_uses_the_configured_output_directory() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("declsynth.toml"),
        "[output]\ndirectory = \"out\"\n",
    )
    .unwrap();
    declsynth(&home)
        .args(["generate", "--input"])
        .arg(demo("graph.json"))
        .assert()
        .success();
    assert!(home
        .path()
        .join("out/demo/casedetection/DirectionCaseDetection.kt")
        .is_file());
}

#[test]
fn generate_requires_an_output_directory() {
    let home = TempDir::new().unwrap();
    declsynth(&home)
        .args(["generate", "--input"])
        .arg(demo("graph.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no output directory"));
}

#[test]
fn missing_input_fails() {
    let home = TempDir::new().unwrap();
    declsynth(&home)
        .args(["check", "--input", "nowhere.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load declaration graph"));
}

#[test]
fn explicit_config_must_exist() {
    let home = TempDir::new().unwrap();
    declsynth(&home)
        .args(["--config", "absent.toml", "markers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml does not exist"));
}

#[test]
fn synthesis_failures_exit_nonzero() {
    let home = TempDir::new().unwrap();
    let graph = home.path().join("graph.json");
    std::fs::write(
        &graph,
        r#"{"declarations": [{
            "kind": "class", "name": "Plain", "package": "demo",
            "markers": [{"name": "ContentType", "arguments": {"authority": "demo", "path": "plain"}}],
            "properties": [{"name": "id", "type": "Int"}]
        }]}"#,
    )
    .unwrap();
    declsynth(&home)
        .args(["check", "--input"])
        .arg(&graph)
        .assert()
        .failure()
        .stderr(predicate::str::contains("demo.Plain"));
}
