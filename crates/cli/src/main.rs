mod cmd;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::ConfigArgs;
use crate::output::{OutputFormat, print_error};

/// Build an EDK2 package and stage its output onto removable media
#[derive(Parser)]
#[command(name = "edkb")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the package, write startup.nsh and copy the output to removable media (default)
  Build {
    #[command(flatten)]
    config: ConfigArgs,
  },

  /// Show the detected host, profile and paths without building
  Info {
    #[command(flatten)]
    config: ConfigArgs,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() {
  let cli = Cli::parse();

  // Library events stay quiet unless asked for; user-facing lines come from `output`
  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    None => cmd::cmd_build(ConfigArgs::default(), cli.verbose),
    Some(Commands::Build { config }) => cmd::cmd_build(config, cli.verbose),
    Some(Commands::Info { config, format }) => cmd::cmd_info(config, format),
  };

  if let Err(e) = result {
    print_error(&format!("{:#}", e));
    std::process::exit(1);
  }
}
