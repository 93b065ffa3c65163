//! Deploy strategies.
//!
//! A strategy moves named files out of the build output directory to somewhere
//! useful. Strategies never fail the run: every outcome, including a skip, is
//! returned as a [`DeployReport`] for the caller to print.

mod usb;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::BuildConfig;
use crate::execute::{CommandRunner, ExecError, describe_code};
use crate::platform::Host;

pub use usb::{CopyMechanism, RemovableMediaCopy, WSLPATH, XCOPY, windows_join};

/// Something that can stage build output somewhere outside the build tree.
pub trait DeployStrategy {
  fn name(&self) -> &'static str;

  /// Copy files from `output_dir`. External tools, if any, go through `runner`.
  fn deploy(&self, output_dir: &Path, runner: &dyn CommandRunner) -> DeployReport;
}

/// The strategies a [`Profile`](crate::Profile) can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
  RemovableMedia,
}

impl StrategyKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::RemovableMedia => "removable-media",
    }
  }

  /// Build the strategy for `host` from the run configuration.
  pub fn instantiate(self, host: Host, config: &BuildConfig) -> Box<dyn DeployStrategy> {
    match self {
      Self::RemovableMedia => {
        let mechanism = if host.is_wsl() {
          CopyMechanism::WslXcopy
        } else {
          CopyMechanism::Direct
        };
        Box::new(RemovableMediaCopy::new(
          config.copy_dest.clone(),
          config.files_to_copy.clone(),
          mechanism,
        ))
      }
    }
  }
}

/// Why a single file did not reach its destination.
#[derive(Debug, Error)]
pub enum CopyError {
  #[error("{}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("could not translate {} to a Windows path (wslpath exited with {})", path.display(), describe_code(.code))]
  Translate { path: PathBuf, code: Option<i32> },

  #[error("xcopy failed with error {}", describe_code(.code))]
  Xcopy { code: Option<i32> },

  #[error(transparent)]
  Exec(#[from] ExecError),
}

/// Result of copying one file.
#[derive(Debug)]
pub struct FileCopy {
  pub file: String,
  /// The destination path on success.
  pub result: Result<String, CopyError>,
}

#[derive(Debug)]
pub enum DeployOutcome {
  /// Nothing was attempted.
  Skipped { reason: String },
  /// One entry per configured file, in order.
  Attempted(Vec<FileCopy>),
}

#[derive(Debug)]
pub struct DeployReport {
  pub strategy: &'static str,
  pub outcome: DeployOutcome,
}

impl DeployReport {
  pub fn skipped(strategy: &'static str, reason: impl Into<String>) -> Self {
    Self {
      strategy,
      outcome: DeployOutcome::Skipped { reason: reason.into() },
    }
  }

  pub fn is_skipped(&self) -> bool {
    matches!(self.outcome, DeployOutcome::Skipped { .. })
  }

  /// Files attempted, empty when skipped.
  pub fn files(&self) -> &[FileCopy] {
    match &self.outcome {
      DeployOutcome::Skipped { .. } => &[],
      DeployOutcome::Attempted(files) => files,
    }
  }

  pub fn copied(&self) -> usize {
    self.files().iter().filter(|f| f.result.is_ok()).count()
  }

  pub fn failed(&self) -> usize {
    self.files().iter().filter(|f| f.result.is_err()).count()
  }
}
