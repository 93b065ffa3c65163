//! Driving the EDK2 build.
//!
//! Three external steps make up a build: compiling BaseTools, clearing the
//! package's previous output and running `build` itself through the setup
//! script. Any failure here is fatal for the run.

mod env;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::execute::{CommandRunner, CommandSpec, ExecError, describe_code};
use crate::platform::{Host, Toolchain};
use crate::profile::Profile;

pub use env::{IASL_PREFIX, NASM_PREFIX, process_env, toolchain_env};

/// External step that failed to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  BaseTools,
  Build,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Stage::BaseTools => write!(f, "BaseTools build"),
      Stage::Build => write!(f, "build"),
    }
  }
}

#[derive(Debug, Error)]
pub enum BuildError {
  #[error(
    "failed to build BaseTools with error {}: {}. EDK2 prerequisites may not be installed",
    describe_code(.code),
    .cmd
  )]
  BaseTools { cmd: String, code: Option<i32> },

  #[error("failed to build the project with error {}: {}", describe_code(.code), .cmd)]
  Build { cmd: String, code: Option<i32> },

  #[error("failed to run {stage}: {source}")]
  Spawn {
    stage: Stage,
    #[source]
    source: ExecError,
  },

  #[error("failed to remove stale output {}: {source}", path.display())]
  Clean {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Command that compiles the BaseTools.
///
/// Windows rebuilds through the setup script; everywhere else the C sources
/// are built with make.
pub fn base_tools_command(profile: &Profile, config: &BuildConfig) -> CommandSpec {
  let spec = match profile.host {
    Host::Windows => CommandSpec::shell(profile.shell_program(), &format!("{} Rebuild", profile.setup)),
    Host::Linux | Host::Wsl | Host::MacOs => {
      let sources = config.edk_dir.join("BaseTools").join("Source").join("C");
      CommandSpec::new("make").arg("-C").arg(sources.to_string_lossy())
    }
  };
  spec.current_dir(&config.edk_dir)
}

/// The shell script that loads the EDK2 environment and runs `build`.
pub fn build_script(profile: &Profile, config: &BuildConfig, toolchain: Toolchain) -> String {
  let mut script = format!(
    "{} && build -a {} -t {} -b {} -p {}",
    profile.setup,
    config.arch,
    toolchain,
    config.target,
    config.package_descriptor()
  );
  for define in &config.defines {
    script.push_str(" -D ");
    script.push_str(define);
  }
  script
}

/// Build BaseTools, failing the run if that does not succeed.
pub fn ensure_base_tools(
  runner: &dyn CommandRunner,
  profile: &Profile,
  config: &BuildConfig,
  env: &BTreeMap<String, String>,
) -> Result<(), BuildError> {
  let spec = base_tools_command(profile, config).envs(env);
  info!(cmd = %spec, "building BaseTools");

  let output = runner.run(&spec).map_err(|source| BuildError::Spawn {
    stage: Stage::BaseTools,
    source,
  })?;

  if !output.success() {
    return Err(BuildError::BaseTools {
      cmd: spec.to_string(),
      code: output.code,
    });
  }
  Ok(())
}

/// Remove `<output_dir>/<package>` so `build` cannot skip regenerating it.
///
/// Returns the removed path, or `None` if there was nothing to remove.
pub fn clean_package_output(output_dir: &Path, package: &str) -> Result<Option<PathBuf>, BuildError> {
  let stale = output_dir.join(package);
  if !stale.exists() {
    return Ok(None);
  }

  debug!(path = %stale.display(), "removing stale build output");
  let removed = if stale.is_dir() {
    fs::remove_dir_all(&stale)
  } else {
    fs::remove_file(&stale)
  };
  removed.map_err(|source| BuildError::Clean {
    path: stale.clone(),
    source,
  })?;
  Ok(Some(stale))
}

/// Run the package build through the profile's shell.
pub fn run_build(
  runner: &dyn CommandRunner,
  profile: &Profile,
  config: &BuildConfig,
  toolchain: Toolchain,
  env: &BTreeMap<String, String>,
) -> Result<(), BuildError> {
  let script = build_script(profile, config, toolchain);
  let spec = CommandSpec::shell(profile.shell_program(), &script)
    .current_dir(&config.edk_dir)
    .envs(env);
  info!(cmd = %script, "running build");

  let output = runner.run(&spec).map_err(|source| BuildError::Spawn {
    stage: Stage::Build,
    source,
  })?;

  if !output.success() {
    return Err(BuildError::Build {
      cmd: script,
      code: output.code,
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::FakeRunner;
  use tempfile::TempDir;

  fn config() -> BuildConfig {
    BuildConfig::defaults_for(Host::Linux, PathBuf::from("/src/edk2"), "alice")
  }

  #[test]
  fn build_script_matches_edk2_invocation() {
    let profile = Profile::for_host(Host::Linux);

    let script = build_script(&profile, &config(), Toolchain::Gcc5);

    assert_eq!(
      script,
      "source edksetup.sh && build -a X64 -t GCC5 -b NOOPT -p WpbtTestPkg/WpbtTestPkg.dsc -D DEBUG_ON_SERIAL_PORT"
    );
  }

  #[test]
  fn build_script_on_windows() {
    let profile = Profile::for_host(Host::Windows);

    let script = build_script(&profile, &config(), profile.toolchain);

    assert!(script.starts_with("edksetup.bat && build -a X64 -t VS2019 -b NOOPT"));
  }

  #[test]
  fn base_tools_uses_make_off_windows() {
    let config = config();
    for host in [Host::Linux, Host::Wsl, Host::MacOs] {
      let spec = base_tools_command(&Profile::for_host(host), &config);
      assert_eq!(spec.program, "make");
      assert_eq!(spec.args[0], "-C");
      assert_eq!(
        PathBuf::from(&spec.args[1]),
        config.edk_dir.join("BaseTools").join("Source").join("C")
      );
      assert_eq!(spec.cwd.as_deref(), Some(config.edk_dir.as_path()));
    }
  }

  #[test]
  fn base_tools_rebuilds_through_setup_script_on_windows() {
    let spec = base_tools_command(&Profile::for_host(Host::Windows), &config());
    assert_eq!(spec.program, "cmd.exe");
    assert_eq!(spec.args, vec!["/C", "edksetup.bat Rebuild"]);
  }

  #[test]
  fn base_tools_failure_is_fatal_with_code() {
    let runner = FakeRunner::new().exit_with("make", 2);
    let profile = Profile::for_host(Host::Linux);

    let err = ensure_base_tools(&runner, &profile, &config(), &BTreeMap::new()).unwrap_err();

    assert!(matches!(err, BuildError::BaseTools { code: Some(2), .. }));
    assert!(err.to_string().contains("prerequisites may not be installed"));
  }

  #[test]
  fn base_tools_not_installed_names_stage() {
    let runner = FakeRunner::new().not_installed("make");
    let profile = Profile::for_host(Host::MacOs);

    let err = ensure_base_tools(&runner, &profile, &config(), &BTreeMap::new()).unwrap_err();

    assert!(err.to_string().starts_with("failed to run BaseTools build"));
  }

  #[test]
  fn build_failure_reports_script_and_code() {
    let runner = FakeRunner::new().exit_with("/bin/bash", 1);
    let profile = Profile::for_host(Host::Linux);

    let err = run_build(&runner, &profile, &config(), Toolchain::Gcc5, &BTreeMap::new()).unwrap_err();

    match err {
      BuildError::Build { cmd, code } => {
        assert!(cmd.starts_with("source edksetup.sh && build"));
        assert_eq!(code, Some(1));
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn build_passes_injected_env() {
    let runner = FakeRunner::new();
    let profile = Profile::for_host(Host::Windows);
    let mut env = BTreeMap::new();
    env.insert(NASM_PREFIX.to_string(), "C:\\nasm\\".to_string());

    run_build(&runner, &profile, &config(), Toolchain::Vs2019, &env).unwrap();

    let calls = runner.calls();
    assert_eq!(calls[0].program, "cmd.exe");
    assert_eq!(calls[0].env.get(NASM_PREFIX).map(String::as_str), Some("C:\\nasm\\"));
  }

  #[test]
  fn clean_removes_package_subtree_only() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path();
    std::fs::create_dir_all(output_dir.join("WpbtTestPkg").join("WpbtBuilder")).unwrap();
    std::fs::write(output_dir.join("WpbtBuilder.efi"), "efi").unwrap();

    let removed = clean_package_output(output_dir, "WpbtTestPkg").unwrap();

    assert_eq!(removed, Some(output_dir.join("WpbtTestPkg")));
    assert!(!output_dir.join("WpbtTestPkg").exists());
    assert!(output_dir.join("WpbtBuilder.efi").exists());
  }

  #[test]
  fn clean_removes_stray_file_at_package_path() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("WpbtTestPkg"), "not a directory").unwrap();

    let removed = clean_package_output(temp_dir.path(), "WpbtTestPkg").unwrap();

    assert_eq!(removed, Some(temp_dir.path().join("WpbtTestPkg")));
    assert!(!temp_dir.path().join("WpbtTestPkg").exists());
  }

  #[test]
  fn clean_without_previous_output_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    assert_eq!(clean_package_output(temp_dir.path(), "WpbtTestPkg").unwrap(), None);
  }
}
