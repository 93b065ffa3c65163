//! Host detection.
//!
//! The host decides everything platform-specific about a run: the EDK2 setup
//! script, the default toolchain, the shell used to chain commands and how
//! files reach removable media.

mod host;
mod toolchain;

pub use host::{Host, PlatformError, WSL_KERNEL_MARKER};
pub use toolchain::{Toolchain, UnknownToolchain};

/// Returns the release string of the running kernel (e.g. "6.8.0-45-generic").
///
/// Empty on hosts without `uname`.
#[cfg(unix)]
pub fn kernel_release() -> String {
  rustix::system::uname().release().to_string_lossy().into_owned()
}

#[cfg(not(unix))]
pub fn kernel_release() -> String {
  String::new()
}

/// Returns the login name of the current user.
pub fn current_user() -> String {
  whoami::username()
}
