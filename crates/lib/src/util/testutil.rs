//! Test utilities for edkb-lib.
//!
//! Cross-platform shell helpers for tests that spawn real processes, and
//! [`FakeRunner`], a scripted [`CommandRunner`] that records every call.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::execute::{CommandOutput, CommandRunner, CommandSpec, ExecError};

/// Returns the shell command and args to echo an environment variable.
#[cfg(unix)]
pub fn shell_echo_env(var: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), format!("echo \"${}\"", var)])
}

#[cfg(windows)]
pub fn shell_echo_env(var: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), format!("echo %{}%", var)])
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the command and args to create a marker file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  ("/usr/bin/touch", vec![filename.to_string()])
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  (
    "powershell.exe",
    vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
    ],
  )
}

type Responder = Box<dyn Fn(&CommandSpec) -> Result<CommandOutput, ExecError>>;

/// A [`CommandRunner`] that never spawns anything.
///
/// Responses are keyed by program name; unscripted programs exit 0 with no
/// output.
#[derive(Default)]
pub struct FakeRunner {
  responders: HashMap<String, Responder>,
  calls: RefCell<Vec<CommandSpec>>,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make `program` exit with `code`.
  pub fn exit_with(self, program: &str, code: i32) -> Self {
    self.respond_with(program, move |_| {
      Ok(CommandOutput {
        code: Some(code),
        stdout: String::new(),
      })
    })
  }

  /// Make `program` fail to start, as if it were not installed.
  pub fn not_installed(self, program: &str) -> Self {
    self.respond_with(program, |spec| {
      Err(ExecError::Spawn {
        program: spec.program.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
      })
    })
  }

  pub fn respond_with<F>(mut self, program: &str, responder: F) -> Self
  where
    F: Fn(&CommandSpec) -> Result<CommandOutput, ExecError> + 'static,
  {
    self.responders.insert(program.to_string(), Box::new(responder));
    self
  }

  /// Every command run so far, in order.
  pub fn calls(&self) -> Vec<CommandSpec> {
    self.calls.borrow().clone()
  }

  pub fn programs(&self) -> Vec<String> {
    self.calls.borrow().iter().map(|c| c.program.clone()).collect()
  }
}

impl CommandRunner for FakeRunner {
  fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
    self.calls.borrow_mut().push(spec.clone());
    match self.responders.get(&spec.program) {
      Some(responder) => responder(spec),
      None => Ok(CommandOutput {
        code: Some(0),
        stdout: String::new(),
      }),
    }
  }
}
