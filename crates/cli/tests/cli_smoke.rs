//! CLI smoke tests for edkb.
//!
//! These run the real binary. On unix, `build` also runs against a stand-in
//! EDK2 checkout whose BaseTools makefile and `build` function do nothing.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the edkb binary.
fn edkb_cmd() -> Command {
  cargo_bin_cmd!("edkb")
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  edkb_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  edkb_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("edkb"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "info"] {
    edkb_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("--copy-dest"));
  }
}

// =============================================================================
// info
// =============================================================================

#[test]
fn info_shows_profile() {
  let temp = TempDir::new().unwrap();

  edkb_cmd()
    .arg("info")
    .arg("--edk-dir")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Toolchain"))
    .stdout(predicate::str::contains("WpbtTestPkg/WpbtTestPkg.dsc"));
}

#[test]
fn info_json_reflects_overrides() {
  let temp = TempDir::new().unwrap();

  let output = edkb_cmd()
    .args(["info", "--format", "json", "--package", "ShellPkg", "--target", "release"])
    .args(["--toolchain", "clang38", "--copy-dest", ""])
    .arg("--edk-dir")
    .arg(temp.path())
    .output()
    .unwrap();

  assert!(output.status.success());
  let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(info["config"]["package"], "ShellPkg");
  assert_eq!(info["config"]["target"], "RELEASE");
  assert_eq!(info["toolchain"], "CLANG38");
  assert!(info["config"]["copy_dest"].is_null());
  assert!(info["output_dir"].as_str().unwrap().contains("RELEASE_CLANG38"));
}

#[test]
fn info_reads_config_file() {
  let temp = TempDir::new().unwrap();
  let config = temp.path().join("edkb.toml");
  std::fs::write(&config, "package = \"MdeModulePkg\"\narch = \"IA32\"\n").unwrap();

  edkb_cmd()
    .arg("info")
    .arg("--config")
    .arg(&config)
    .arg("--edk-dir")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("MdeModulePkg/MdeModulePkg.dsc"))
    .stdout(predicate::str::contains("IA32"));
}

#[test]
fn bad_config_file_fails() {
  let temp = TempDir::new().unwrap();
  let config = temp.path().join("edkb.toml");
  std::fs::write(&config, "no_such_option = true\n").unwrap();

  edkb_cmd()
    .arg("info")
    .arg("--config")
    .arg(&config)
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid config file"));
}

#[test]
fn unknown_toolchain_is_rejected() {
  edkb_cmd()
    .args(["info", "--toolchain", "MSVC"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown toolchain"));
}

// =============================================================================
// build
// =============================================================================

#[test]
fn build_without_edk2_checkout_fails_at_base_tools() {
  let temp = TempDir::new().unwrap();

  edkb_cmd()
    .arg("build")
    .arg("--edk-dir")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("BaseTools"));

  // Nothing was staged
  assert!(!temp.path().join("Build").exists());
}

/// A checkout where BaseTools compiles and `build` succeeds without output.
#[cfg(unix)]
fn stub_checkout() -> TempDir {
  let temp = TempDir::new().unwrap();
  let sources = temp.path().join("BaseTools").join("Source").join("C");
  std::fs::create_dir_all(&sources).unwrap();
  std::fs::write(sources.join("Makefile"), "all:\n\t@true\n").unwrap();
  std::fs::write(temp.path().join("edksetup.sh"), "build() { :; }\n").unwrap();
  temp
}

#[cfg(unix)]
#[test]
fn skipped_copy_is_reported_once() {
  let edk = stub_checkout();
  let missing = edk.path().join("no-such-drive");

  let output = edkb_cmd()
    .env_remove("RUST_LOG")
    .arg("build")
    .arg("--edk-dir")
    .arg(edk.path())
    .arg("--copy-dest")
    .arg(&missing)
    .output()
    .unwrap();

  assert!(output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert_eq!(stderr.matches("not set up").count(), 1, "stderr was:\n{stderr}");
}

#[cfg(unix)]
#[test]
fn failed_file_copy_is_reported_once() {
  let edk = stub_checkout();
  let media = TempDir::new().unwrap();

  let output = edkb_cmd()
    .env_remove("RUST_LOG")
    .arg("build")
    .arg("--edk-dir")
    .arg(edk.path())
    .arg("--copy-dest")
    .arg(media.path())
    .arg("--file")
    .arg("a.bin")
    .output()
    .unwrap();

  assert!(output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr).to_lowercase();
  assert_eq!(stderr.matches("failed to copy").count(), 1, "stderr was:\n{stderr}");
  assert!(stderr.contains("a.bin"));
}

#[test]
fn verbose_build_shows_library_events() {
  let temp = TempDir::new().unwrap();

  edkb_cmd()
    .env_remove("RUST_LOG")
    .arg("--verbose")
    .arg("build")
    .arg("--edk-dir")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("DEBUG"));
}
