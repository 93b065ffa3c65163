//! Run configuration.
//!
//! A [`BuildConfig`] is assembled once at startup from built-in defaults, an
//! optional TOML file and command-line flags, then passed by reference into
//! the orchestrator. Nothing mutates it during a run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::{Host, Toolchain};

/// Package built when none is configured.
pub const DEFAULT_PACKAGE: &str = "WpbtTestPkg";

/// Default `-a` argument.
pub const DEFAULT_ARCH: &str = "X64";

/// Build output files copied to removable media by default.
pub const DEFAULT_FILES_TO_COPY: &[&str] = &["WpbtBuilder.efi", STARTUP_NSH_NAME];

/// Name of the UEFI shell auto-run script dropped into the output directory.
pub const STARTUP_NSH_NAME: &str = "startup.nsh";

/// Default contents of `startup.nsh`: switch to the first filesystem and run
/// the builder against the test binary.
pub const STARTUP_NSH: &str = "\nfs0:\nWpbtBuilder.efi NativeHello.exe\n";

/// Preprocessor defines passed with `-D` by default.
pub const DEFAULT_DEFINES: &[&str] = &["DEBUG_ON_SERIAL_PORT"];

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config file {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("failed to resolve working directory: {0}")]
  WorkingDir(#[source] std::io::Error),

  #[error("unknown build target `{0}` (expected one of NOOPT, DEBUG, RELEASE)")]
  UnknownTarget(String),
}

/// EDK2 build target (the `-b` argument of `build`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildTarget {
  #[default]
  Noopt,
  Debug,
  Release,
}

impl BuildTarget {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Noopt => "NOOPT",
      Self::Debug => "DEBUG",
      Self::Release => "RELEASE",
    }
  }
}

impl FromStr for BuildTarget {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_uppercase().as_str() {
      "NOOPT" => Ok(Self::Noopt),
      "DEBUG" => Ok(Self::Debug),
      "RELEASE" => Ok(Self::Release),
      _ => Err(ConfigError::UnknownTarget(s.to_string())),
    }
  }
}

impl fmt::Display for BuildTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Immutable parameters of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
  /// Root of the EDK2 checkout; commands run from here.
  pub edk_dir: PathBuf,
  pub package: String,
  pub arch: String,
  pub target: BuildTarget,
  /// Replaces the host profile's toolchain when set.
  pub toolchain: Option<Toolchain>,
  pub defines: Vec<String>,
  pub files_to_copy: Vec<String>,
  /// Removable media destination. `None` disables copying.
  pub copy_dest: Option<String>,
  pub startup_nsh: String,
}

impl BuildConfig {
  /// Built-in defaults for `host`, rooted at `edk_dir`.
  pub fn defaults_for(host: Host, edk_dir: PathBuf, user: &str) -> Self {
    Self {
      edk_dir,
      package: DEFAULT_PACKAGE.to_string(),
      arch: DEFAULT_ARCH.to_string(),
      target: BuildTarget::default(),
      toolchain: None,
      defines: DEFAULT_DEFINES.iter().map(|d| d.to_string()).collect(),
      files_to_copy: DEFAULT_FILES_TO_COPY.iter().map(|f| f.to_string()).collect(),
      copy_dest: Some(default_copy_dest(host, user)),
      startup_nsh: STARTUP_NSH.to_string(),
    }
  }

  /// Directory that holds the EDK2 checkout and the prebuilt Windows tools.
  pub fn base_dir(&self) -> PathBuf {
    self.edk_dir.parent().unwrap_or(&self.edk_dir).to_path_buf()
  }

  /// Where `build` writes artifacts: `Build/<pkg>/<target>_<toolchain>/<arch>`.
  pub fn output_dir(&self, toolchain: Toolchain) -> PathBuf {
    self
      .edk_dir
      .join("Build")
      .join(&self.package)
      .join(format!("{}_{}", self.target, toolchain))
      .join(&self.arch)
  }

  /// Package descriptor path relative to `edk_dir`, as `build -p` expects it.
  pub fn package_descriptor(&self) -> String {
    format!("{0}/{0}.dsc", self.package)
  }

  /// Layer `overrides` on top of this configuration.
  pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
    if let Some(edk_dir) = overrides.edk_dir {
      self.edk_dir = edk_dir;
    }
    if let Some(package) = overrides.package {
      self.package = package;
    }
    if let Some(arch) = overrides.arch {
      self.arch = arch;
    }
    if let Some(target) = overrides.target {
      self.target = target;
    }
    if overrides.toolchain.is_some() {
      self.toolchain = overrides.toolchain;
    }
    if let Some(defines) = overrides.defines {
      self.defines = defines;
    }
    if let Some(files) = overrides.files_to_copy {
      self.files_to_copy = files;
    }
    if let Some(dest) = overrides.copy_dest {
      self.copy_dest = Some(dest).filter(|d| !d.is_empty());
    }
    if let Some(startup_nsh) = overrides.startup_nsh {
      self.startup_nsh = startup_nsh;
    }
    self
  }
}

/// Partial configuration, as read from a TOML file or assembled from flags.
///
/// ```toml
/// package = "ShellPkg"
/// target = "DEBUG"
/// toolchain = "CLANG38"
/// copy_dest = "/media/me/EFI"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
  pub edk_dir: Option<PathBuf>,
  pub package: Option<String>,
  pub arch: Option<String>,
  pub target: Option<BuildTarget>,
  pub toolchain: Option<Toolchain>,
  pub defines: Option<Vec<String>>,
  pub files_to_copy: Option<Vec<String>>,
  /// An empty string clears the default destination.
  pub copy_dest: Option<String>,
  pub startup_nsh: Option<String>,
}

impl ConfigOverrides {
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Default removable media mount point for `host`.
pub fn default_copy_dest(host: Host, user: &str) -> String {
  match host {
    Host::Wsl | Host::Windows => "D:\\".to_string(),
    Host::Linux => format!("/media/{}/FAT32", user),
    Host::MacOs => "/Volumes/FAT32/".to_string(),
  }
}

/// Default EDK2 root: the parent of the working directory, since edkb is
/// normally launched from inside a package directory.
pub fn default_edk_dir() -> Result<PathBuf, ConfigError> {
  let cwd = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
  let cwd = dunce::canonicalize(&cwd).unwrap_or(cwd);
  Ok(cwd.parent().map(Path::to_path_buf).unwrap_or(cwd))
}
