//! Toolchain environment for Windows builds.
//!
//! EDK2 on Windows needs NASM and the ACPI compiler. When the caller has not
//! pointed `NASM_PREFIX`/`IASL_PREFIX` anywhere, the copies prepared next to
//! the EDK2 checkout (`<base>/Build/Windows/{nasm,asl}`) are used.

use std::collections::BTreeMap;
use std::path::{MAIN_SEPARATOR, Path};

use tracing::{debug, info};

use crate::platform::Host;

pub const NASM_PREFIX: &str = "NASM_PREFIX";
pub const IASL_PREFIX: &str = "IASL_PREFIX";

/// Variables to add to the environment of every EDK2 child process.
///
/// `lookup` reads the caller's environment. A variable that is already set
/// to a non-empty value is never replaced. Returns an empty map on hosts
/// other than Windows.
pub fn toolchain_env<F>(host: Host, base_dir: &Path, lookup: F) -> BTreeMap<String, String>
where
  F: Fn(&str) -> Option<String>,
{
  let mut injected = BTreeMap::new();
  if host != Host::Windows {
    return injected;
  }

  let prepared = base_dir.join("Build").join("Windows");
  let defaults = [
    // NASM_PREFIX is concatenated with the executable name, so it keeps a trailing separator
    (NASM_PREFIX, format!("{}{}", prepared.join("nasm").display(), MAIN_SEPARATOR)),
    (IASL_PREFIX, prepared.join("asl").display().to_string()),
  ];

  for (name, value) in defaults {
    if lookup(name).is_some_and(|v| !v.is_empty()) {
      debug!(var = name, "already set, keeping caller's value");
      continue;
    }
    info!(var = name, value = %value, "using prepared toolchain dependency");
    injected.insert(name.to_string(), value);
  }

  injected
}

/// Reads a variable from this process's environment.
pub fn process_env(name: &str) -> Option<String> {
  std::env::var(name).ok()
}
