use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fembuild_lib::config::Config;

mod cmd;
mod exit;
mod output;

use cmd::{BuildArgs, PlanArgs, SmokeArgs, cmd_build, cmd_info, cmd_options, cmd_plan, cmd_smoke};
use output::{OutputFormat, print_error};

/// fembuild - resolve, configure and build the Elmer FEM solver
#[derive(Parser)]
#[command(name = "fembuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Config file (default: $XDG_CONFIG_HOME/fembuild/config.toml)
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Resolve dependencies and compile flags without building
  Plan(PlanArgs),

  /// Configure, compile, install and optionally verify the solver
  Build(BuildArgs),

  /// Run the post-install smoke test against an installation
  Smoke(SmokeArgs),

  /// List build options with their defaults
  Options {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show detected platform facts
  Info {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  // Usage errors share code 1 with configuration errors; 2 is a failed Configure.
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e) => {
      let code = if e.use_stderr() { exit::USAGE } else { exit::OK };
      let _ = e.print();
      return ExitCode::from(code);
    }
  };

  let default_level = if cli.verbose { "info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli) {
    Ok(code) => ExitCode::from(code),
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::from(exit::for_error(&err))
    }
  }
}

fn run(cli: Cli) -> Result<u8> {
  // `options` needs no configuration, so a broken config file cannot hide it.
  let load_config = || Config::load(cli.config.as_deref()).context("Failed to load configuration");

  match cli.command {
    Commands::Options { output } => cmd_options(output)?,
    Commands::Plan(args) => cmd_plan(&load_config()?, &args)?,
    Commands::Build(args) => return cmd_build(&load_config()?, &args),
    Commands::Smoke(args) => cmd_smoke(&load_config()?, &args, cli.verbose)?,
    Commands::Info { output } => cmd_info(&load_config()?, output)?,
  }
  Ok(exit::OK)
}
