//! Implementation of the `edkb build` command.
//!
//! Runs the whole build → stage → deploy procedure for the detected host and
//! prints what happened. Fatal errors propagate; deploy problems are printed
//! as warnings and do not change the exit status.

use anyhow::{Context, Result};

use edkb_lib::deploy::{DeployOutcome, DeployReport};
use edkb_lib::{Host, Orchestrator, Profile, RunSummary, SystemRunner};

use crate::cmd::ConfigArgs;
use crate::output::{format_duration, print_info, print_stat, print_success, print_warning};

pub fn cmd_build(args: ConfigArgs, verbose: bool) -> Result<()> {
  let host = Host::current().context("Cannot build on this host")?;
  let config = args.resolve(host)?;
  let orchestrator = Orchestrator::new(config, Profile::for_host(host), SystemRunner);

  let config = orchestrator.config();
  print_info(&format!(
    "Building {} ({} {} {}) on {}",
    config.package,
    config.arch,
    config.target,
    orchestrator.toolchain(),
    host
  ));

  let summary = orchestrator.run().context("Build failed")?;
  print_summary(host, &summary, verbose);

  Ok(())
}

fn print_summary(host: Host, summary: &RunSummary, verbose: bool) {
  print_success(&format!(
    "Successfully built onto {} in {}",
    summary.output_dir.display(),
    format_duration(summary.build_time)
  ));

  if verbose {
    for (name, value) in &summary.injected_env {
      print_stat(name, value);
    }
    if let Some(cleaned) = &summary.cleaned {
      print_stat("Removed", &cleaned.display().to_string());
    }
    print_stat("Staged", &summary.startup_script.display().to_string());
  }

  if summary.deploys.is_empty() {
    print_info(&format!("No deploy strategy for {}, output left in place", host));
  }
  for report in &summary.deploys {
    print_deploy(report);
  }
}

fn print_deploy(report: &DeployReport) {
  match &report.outcome {
    DeployOutcome::Skipped { reason } => print_warning(reason),
    DeployOutcome::Attempted(files) => {
      for copy in files {
        match &copy.result {
          Ok(dest) => print_success(&format!("Copied as: {}", dest)),
          Err(e) => print_warning(&format!("Failed to copy {}: {}", copy.file, e)),
        }
      }
    }
  }
}
