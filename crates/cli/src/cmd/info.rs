use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use edkb_lib::platform::kernel_release;
use edkb_lib::{BuildConfig, Host, Profile, Toolchain};

use crate::cmd::ConfigArgs;
use crate::output::{OutputFormat, print_info, print_json, print_stat};

#[derive(Serialize)]
struct Info<'a> {
  host: Host,
  kernel_release: String,
  profile: &'a Profile,
  toolchain: Toolchain,
  base_dir: PathBuf,
  output_dir: PathBuf,
  config: &'a BuildConfig,
}

pub fn cmd_info(args: ConfigArgs, format: OutputFormat) -> Result<()> {
  let host = Host::current().context("Cannot detect host")?;
  let profile = Profile::for_host(host);
  let config = args.resolve(host)?;
  let toolchain = config.toolchain.unwrap_or(profile.toolchain);

  let info = Info {
    host,
    kernel_release: kernel_release(),
    profile: &profile,
    toolchain,
    base_dir: config.base_dir(),
    output_dir: config.output_dir(toolchain),
    config: &config,
  };

  if format.is_json() {
    return print_json(&info);
  }

  print_info(&format!("edkb v{}", env!("CARGO_PKG_VERSION")));
  println!();
  print_stat("Host", info.host.as_str());
  print_stat("Kernel", &info.kernel_release);
  print_stat("Setup", profile.setup);
  print_stat("Shell", profile.shell_program());
  print_stat("Toolchain", toolchain.as_str());
  let strategies: Vec<_> = profile.strategies.iter().map(|s| s.as_str()).collect();
  print_stat(
    "Deploy",
    &if strategies.is_empty() {
      "none".to_string()
    } else {
      strategies.join(", ")
    },
  );
  println!();
  print_stat("EDK2 root", &config.edk_dir.display().to_string());
  print_stat("Package", &config.package_descriptor());
  print_stat("Target", &format!("{} {}", config.target, config.arch));
  print_stat("Output", &info.output_dir.display().to_string());
  print_stat("Copy to", config.copy_dest.as_deref().unwrap_or("not set"));
  print_stat("Files", &config.files_to_copy.join(", "));

  Ok(())
}
