use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Substring of the kernel release that identifies a Linux kernel running
/// under the Windows Subsystem for Linux.
pub const WSL_KERNEL_MARKER: &str = "Microsoft";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
  #[error("unimplemented platform: {os}")]
  Unsupported { os: String },
}

/// Host variants edkb knows how to drive EDK2 on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
  Linux,
  /// Linux running on a Windows kernel. Builds like Linux, copies like Windows.
  Wsl,
  MacOs,
  Windows,
}

impl Host {
  /// Classify a host from its OS identifier (as in `std::env::consts::OS`) and
  /// kernel release string.
  pub fn detect(os: &str, kernel_release: &str) -> Result<Self, PlatformError> {
    match os {
      "linux" if kernel_release.contains(WSL_KERNEL_MARKER) => Ok(Self::Wsl),
      "linux" => Ok(Self::Linux),
      "macos" => Ok(Self::MacOs),
      "windows" => Ok(Self::Windows),
      other => Err(PlatformError::Unsupported { os: other.to_string() }),
    }
  }

  /// Detect the current host at runtime
  pub fn current() -> Result<Self, PlatformError> {
    Self::detect(std::env::consts::OS, &super::kernel_release())
  }

  pub fn is_wsl(&self) -> bool {
    matches!(self, Self::Wsl)
  }

  /// Command interpreter used when a profile does not name one.
  pub fn default_shell(&self) -> &'static str {
    match self {
      Self::Windows => "cmd.exe",
      Self::Linux | Self::Wsl | Self::MacOs => "/bin/sh",
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::Wsl => "wsl",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
    }
  }
}

impl fmt::Display for Host {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
