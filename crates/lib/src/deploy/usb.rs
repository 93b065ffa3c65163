//! Copy build output onto a USB drive.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::{CopyError, DeployOutcome, DeployReport, DeployStrategy, FileCopy};
use crate::execute::{CommandRunner, CommandSpec, OutputMode};

/// Translates a WSL path into its Windows equivalent.
pub const WSLPATH: &str = "wslpath";

/// Windows' own copy tool, reachable from WSL through the C: drive mount.
pub const XCOPY: &str = "/mnt/c/Windows/System32/xcopy.exe";

const NOT_SET_UP: &str = "Did not copy output to USB. The copy destination does not exist or is not set up.";

/// How files reach the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMechanism {
  /// Plain filesystem copy.
  Direct,
  /// Hand the copy to `xcopy.exe` on the Windows side. Mounting the drive inside
  /// WSL needs root and is unreliable.
  WslXcopy,
}

/// Copies a fixed list of files to a removable media destination.
#[derive(Debug, Clone)]
pub struct RemovableMediaCopy {
  dest: Option<String>,
  files: Vec<String>,
  mechanism: CopyMechanism,
}

impl RemovableMediaCopy {
  pub fn new(dest: Option<String>, files: Vec<String>, mechanism: CopyMechanism) -> Self {
    Self { dest, files, mechanism }
  }

  /// The destination, if copying should be attempted at all.
  ///
  /// Under WSL the destination is a Windows path that cannot be checked from
  /// Linux, so only its presence is required.
  fn usable_destination(&self) -> Option<&str> {
    let dest = self.dest.as_deref().filter(|d| !d.is_empty())?;
    match self.mechanism {
      CopyMechanism::WslXcopy => Some(dest),
      CopyMechanism::Direct => Path::new(dest).exists().then_some(dest),
    }
  }
}

impl DeployStrategy for RemovableMediaCopy {
  fn name(&self) -> &'static str {
    "removable-media"
  }

  fn deploy(&self, output_dir: &Path, runner: &dyn CommandRunner) -> DeployReport {
    let Some(dest) = self.usable_destination() else {
      warn!(dest = ?self.dest, "copy destination does not exist or is not set up");
      return DeployReport::skipped(self.name(), NOT_SET_UP);
    };

    let files = self
      .files
      .iter()
      .map(|file| {
        let result = match self.mechanism {
          CopyMechanism::Direct => copy_direct(output_dir, dest, file),
          CopyMechanism::WslXcopy => copy_with_xcopy(runner, output_dir, dest, file),
        };
        match &result {
          Ok(copied_to) => info!(file = %file, dest = %copied_to, "copied"),
          Err(e) => warn!(file = %file, error = %e, "failed to copy"),
        }
        FileCopy {
          file: file.clone(),
          result,
        }
      })
      .collect();

    DeployReport {
      strategy: self.name(),
      outcome: DeployOutcome::Attempted(files),
    }
  }
}

fn copy_direct(output_dir: &Path, dest: &str, file: &str) -> Result<String, CopyError> {
  let src = output_dir.join(file);
  let target = Path::new(dest).join(file);
  fs::copy(&src, &target).map_err(|source| CopyError::Io { path: src, source })?;
  Ok(target.display().to_string())
}

fn copy_with_xcopy(
  runner: &dyn CommandRunner,
  output_dir: &Path,
  dest: &str,
  file: &str,
) -> Result<String, CopyError> {
  let src = output_dir.join(file);

  let translate = CommandSpec::new(WSLPATH)
    .args(["-a", "-w"])
    .arg(src.to_string_lossy())
    .output(OutputMode::Capture);
  let translated = runner.run(&translate)?;
  if !translated.success() || translated.stdout.is_empty() {
    return Err(CopyError::Translate {
      path: src,
      code: translated.code,
    });
  }

  let copy = CommandSpec::new(XCOPY)
    .arg(translated.stdout)
    .arg(dest)
    .arg("/Y")
    .output(OutputMode::Discard);
  let copied = runner.run(&copy)?;
  if !copied.success() {
    return Err(CopyError::Xcopy { code: copied.code });
  }

  Ok(windows_join(dest, file))
}

/// Join a file name onto a Windows directory path.
pub fn windows_join(dir: &str, file: &str) -> String {
  if dir.ends_with(['\\', '/', ':']) {
    format!("{}{}", dir, file)
  } else {
    format!("{}\\{}", dir, file)
  }
}
