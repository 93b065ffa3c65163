//! edkb-lib: build and deploy orchestration for EDK2 packages
//!
//! This crate provides the pieces the `edkb` binary wires together:
//! - `Host` / `Profile`: which toolchain, setup script and deploy strategies apply
//! - `BuildConfig`: the immutable parameters of a run
//! - `CommandRunner`: the seam every external process goes through
//! - `Orchestrator`: the linear build → stage → deploy procedure

pub mod build;
pub mod config;
pub mod deploy;
pub mod execute;
pub mod orchestrate;
pub mod platform;
pub mod profile;
pub mod stage;
pub mod util;

pub use config::{BuildConfig, BuildTarget, ConfigError, ConfigOverrides};
pub use execute::{CommandOutput, CommandRunner, CommandSpec, ExecError, OutputMode, SystemRunner};
pub use orchestrate::{Orchestrator, RunError, RunSummary};
pub use platform::{Host, PlatformError, Toolchain};
pub use profile::Profile;
