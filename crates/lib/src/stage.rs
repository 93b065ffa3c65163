//! Staging of the UEFI shell startup script.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::STARTUP_NSH_NAME;

#[derive(Debug, Error)]
pub enum StageError {
  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Write `contents` to `startup.nsh` in `output_dir`, replacing any previous
/// file. Returns the path written.
pub fn write_startup_script(output_dir: &Path, contents: &str) -> Result<PathBuf, StageError> {
  let path = output_dir.join(STARTUP_NSH_NAME);

  fs::create_dir_all(output_dir).map_err(|source| StageError::Write {
    path: path.clone(),
    source,
  })?;
  fs::write(&path, contents).map_err(|source| StageError::Write {
    path: path.clone(),
    source,
  })?;

  info!(path = %path.display(), "staged startup script");
  Ok(path)
}
