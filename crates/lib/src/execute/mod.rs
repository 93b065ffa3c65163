//! External command execution.
//!
//! Every process edkb starts (BaseTools, `build`, `wslpath`, `xcopy.exe`) is
//! described by a [`CommandSpec`] and handed to a [`CommandRunner`]. The real
//! runner blocks until the child exits; there is no timeout.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Errors raised before a child process produces an exit status.
#[derive(Debug, Error)]
pub enum ExecError {
  #[error("failed to start `{program}`: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },
}

/// What happens to the child's stdout and stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
  /// Both streams go to the terminal.
  #[default]
  Inherit,
  /// Stdout is captured and returned; stderr goes to the terminal.
  Capture,
  /// Both streams are discarded.
  Discard,
}

/// A single process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
  /// Variables added on top of the inherited environment.
  pub env: BTreeMap<String, String>,
  pub output: OutputMode,
}

impl CommandSpec {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      env: BTreeMap::new(),
      output: OutputMode::default(),
    }
  }

  /// Run `script` through `shell` (`-c` for Unix shells, `/C` for cmd.exe).
  pub fn shell(shell: &str, script: &str) -> Self {
    Self::new(shell).args(shell_args(shell)).arg(script)
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
    self.env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
    self
  }

  pub fn output(mut self, mode: OutputMode) -> Self {
    self.output = mode;
    self
  }
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Exit status and captured output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  /// `None` when the process was terminated by a signal.
  pub code: Option<i32>,
  /// Trimmed stdout, only populated in [`OutputMode::Capture`].
  pub stdout: String,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Runs a command to completion and reports how it exited.
///
/// A non-zero exit is not an error at this level; callers decide what a
/// failing status means for their stage.
pub trait CommandRunner {
  fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
  fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
    (**self).run(spec)
  }
}

/// Runs commands as real child processes with `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
    let mut command = Command::new(&spec.program);
    command.args(&spec.args).envs(&spec.env);

    if let Some(cwd) = &spec.cwd {
      command.current_dir(cwd);
    }

    match spec.output {
      OutputMode::Inherit => command.stdout(Stdio::inherit()).stderr(Stdio::inherit()),
      OutputMode::Capture => command.stdout(Stdio::piped()).stderr(Stdio::inherit()),
      OutputMode::Discard => command.stdout(Stdio::null()).stderr(Stdio::null()),
    };

    debug!(program = %spec.program, args = ?spec.args, cwd = ?spec.cwd, "spawning process");

    let output = command.output().map_err(|source| ExecError::Spawn {
      program: spec.program.clone(),
      source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command output");
    }

    Ok(CommandOutput {
      code: output.status.code(),
      stdout,
    })
  }
}

/// Arguments that make `shell` execute the next argument as a script.
fn shell_args(shell: &str) -> Vec<String> {
  // Split on both separators so Windows paths are recognised on any host
  let name = shell.rsplit(['/', '\\']).next().unwrap_or(shell).to_ascii_lowercase();
  if name == "cmd" || name == "cmd.exe" {
    vec!["/C".to_string()]
  } else {
    // Assume Unix-style shell (bash, sh, zsh, etc.)
    vec!["-c".to_string()]
  }
}

/// Human-readable form of an exit code for diagnostics.
pub fn describe_code(code: &Option<i32>) -> String {
  match code {
    Some(code) => code.to_string(),
    None => "signal".to_string(),
  }
}
