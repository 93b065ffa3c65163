//! Per-host build profile.

use serde::Serialize;

use crate::deploy::StrategyKind;
use crate::platform::{Host, Toolchain};

/// Everything platform-specific about a run, derived once from the [`Host`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
  pub host: Host,
  /// Command that loads the EDK2 environment, chained before `build`.
  pub setup: &'static str,
  pub toolchain: Toolchain,
  /// Shell used to run the chained build command; `None` means the host default.
  pub shell: Option<&'static str>,
  /// Deploy strategies, run in order after a successful build.
  pub strategies: Vec<StrategyKind>,
}

impl Profile {
  pub fn for_host(host: Host) -> Self {
    match host {
      Host::Linux | Host::Wsl => Self {
        host,
        setup: "source edksetup.sh",
        toolchain: Toolchain::Gcc5,
        // `source` is a bashism
        shell: Some("/bin/bash"),
        strategies: vec![StrategyKind::RemovableMedia],
      },
      Host::MacOs => Self {
        host,
        setup: "source ./edksetup.sh",
        toolchain: Toolchain::ClangPdb,
        shell: None,
        strategies: Vec::new(),
      },
      Host::Windows => Self {
        host,
        setup: "edksetup.bat",
        toolchain: Toolchain::Vs2019,
        shell: None,
        strategies: vec![StrategyKind::RemovableMedia],
      },
    }
  }

  /// The shell program that runs the composed build command.
  pub fn shell_program(&self) -> &'static str {
    self.shell.unwrap_or_else(|| self.host.default_shell())
  }
}
