//! The build → stage → deploy procedure.
//!
//! Steps run strictly in order and the first fatal error stops the run:
//! 1. Work out the toolchain environment (Windows only)
//! 2. Build BaseTools
//! 3. Remove the package's stale output
//! 4. Run `build`
//! 5. Write `startup.nsh` into the output directory
//! 6. Run each deploy strategy of the profile
//!
//! Deploy strategies cannot fail the run; their reports are collected in the
//! [`RunSummary`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::info;

use crate::build::{self, BuildError, process_env, toolchain_env};
use crate::config::BuildConfig;
use crate::deploy::DeployReport;
use crate::execute::CommandRunner;
use crate::platform::Toolchain;
use crate::profile::Profile;
use crate::stage::{self, StageError};

#[derive(Debug, Error)]
pub enum RunError {
  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Stage(#[from] StageError),
}

/// What a successful run did.
#[derive(Debug)]
pub struct RunSummary {
  pub output_dir: PathBuf,
  /// Variables added to the build environment.
  pub injected_env: BTreeMap<String, String>,
  /// The stale package directory that was removed, if any.
  pub cleaned: Option<PathBuf>,
  pub startup_script: PathBuf,
  /// Time spent in `build`.
  pub build_time: Duration,
  pub deploys: Vec<DeployReport>,
}

type EnvLookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

pub struct Orchestrator<'a, R> {
  config: BuildConfig,
  profile: Profile,
  runner: R,
  env: EnvLookup<'a>,
}

impl<'a, R: CommandRunner> Orchestrator<'a, R> {
  pub fn new(config: BuildConfig, profile: Profile, runner: R) -> Self {
    Self {
      config,
      profile,
      runner,
      env: Box::new(process_env),
    }
  }

  /// Read caller-provided variables through `lookup` instead of the process
  /// environment.
  pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String> + 'a,
  {
    self.env = Box::new(lookup);
    self
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  pub fn profile(&self) -> &Profile {
    &self.profile
  }

  /// The configured toolchain, or the profile's default.
  pub fn toolchain(&self) -> Toolchain {
    self.config.toolchain.unwrap_or(self.profile.toolchain)
  }

  pub fn output_dir(&self) -> PathBuf {
    self.config.output_dir(self.toolchain())
  }

  pub fn run(&self) -> Result<RunSummary, RunError> {
    let config = &self.config;
    let profile = &self.profile;
    let toolchain = self.toolchain();
    let output_dir = self.output_dir();

    info!(
      host = %profile.host,
      package = %config.package,
      toolchain = %toolchain,
      target = %config.target,
      "starting build"
    );

    let injected_env = toolchain_env(profile.host, &config.base_dir(), &self.env);

    build::ensure_base_tools(&self.runner, profile, config, &injected_env)?;
    let cleaned = build::clean_package_output(&output_dir, &config.package)?;

    let started = Instant::now();
    build::run_build(&self.runner, profile, config, toolchain, &injected_env)?;
    let build_time = started.elapsed();
    info!(output_dir = %output_dir.display(), "build succeeded");

    let startup_script = stage::write_startup_script(&output_dir, &config.startup_nsh)?;

    let deploys = profile
      .strategies
      .iter()
      .map(|kind| {
        let strategy = kind.instantiate(profile.host, config);
        info!(strategy = strategy.name(), "deploying");
        strategy.deploy(&output_dir, &self.runner)
      })
      .collect();

    Ok(RunSummary {
      output_dir,
      injected_env,
      cleaned,
      startup_script,
      build_time,
      deploys,
    })
  }
}
