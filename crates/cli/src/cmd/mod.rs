mod build;
mod info;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use edkb_lib::config::default_edk_dir;
use edkb_lib::platform::current_user;
use edkb_lib::{BuildConfig, BuildTarget, ConfigError, ConfigOverrides, Host, Toolchain};

pub use build::cmd_build;
pub use info::cmd_info;

/// Flags that override the built-in configuration.
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
  /// TOML file with configuration overrides
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Root of the EDK2 checkout (default: parent of the working directory)
  #[arg(long, value_name = "DIR")]
  edk_dir: Option<PathBuf>,

  /// Package to build
  #[arg(long)]
  package: Option<String>,

  /// Target architecture
  #[arg(long)]
  arch: Option<String>,

  /// Build target: NOOPT, DEBUG or RELEASE
  #[arg(long)]
  target: Option<BuildTarget>,

  /// Toolchain tag: GCC5, CLANG38, CLANGPDB or VS2019
  #[arg(long)]
  toolchain: Option<Toolchain>,

  /// Removable media destination; an empty value disables copying
  #[arg(long, value_name = "PATH")]
  copy_dest: Option<String>,

  /// Output file to copy (repeatable, replaces the default list)
  #[arg(long = "file", value_name = "NAME")]
  files: Vec<String>,

  /// Preprocessor define passed to build (repeatable, replaces the defaults)
  #[arg(long = "define", value_name = "NAME")]
  defines: Vec<String>,
}

impl ConfigArgs {
  /// Layer defaults, the optional config file and flags into the run configuration.
  pub fn resolve(&self, host: Host) -> Result<BuildConfig> {
    let from_file = match &self.config {
      Some(path) => ConfigOverrides::from_file(path)?,
      None => ConfigOverrides::default(),
    };
    let from_flags = self.overrides();
    let edk_dir = edk_dir_from(&from_file, &from_flags, default_edk_dir)?;

    let mut config = BuildConfig::defaults_for(host, edk_dir, &current_user())
      .apply(from_file)
      .apply(from_flags);

    // Commands run from inside the checkout, so relative roots must be resolved first
    config.edk_dir = std::path::absolute(&config.edk_dir)
      .with_context(|| format!("Failed to resolve EDK2 directory: {}", config.edk_dir.display()))?;

    Ok(config)
  }

  fn overrides(&self) -> ConfigOverrides {
    ConfigOverrides {
      edk_dir: self.edk_dir.clone(),
      package: self.package.clone(),
      arch: self.arch.clone(),
      target: self.target,
      toolchain: self.toolchain,
      defines: Some(self.defines.clone()).filter(|d| !d.is_empty()),
      files_to_copy: Some(self.files.clone()).filter(|f| !f.is_empty()),
      copy_dest: self.copy_dest.clone(),
      startup_nsh: None,
    }
  }
}

/// The EDK2 root from flags, then the config file; `default` only runs when
/// neither names one.
fn edk_dir_from<F>(from_file: &ConfigOverrides, from_flags: &ConfigOverrides, default: F) -> Result<PathBuf, ConfigError>
where
  F: FnOnce() -> Result<PathBuf, ConfigError>,
{
  match from_flags.edk_dir.as_ref().or(from_file.edk_dir.as_ref()) {
    Some(dir) => Ok(dir.clone()),
    None => default(),
  }
}
