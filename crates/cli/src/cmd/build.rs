//! Implementation of the `fembuild build` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use fembuild_lib::config::Config;
use fembuild_lib::execute::ProcessRunner;
use fembuild_lib::orchestrate::{BuildDirs, BuildReport, Orchestrator, StageState, VerifyOutcome};

use super::plan::print_plan;
use super::{SelectionArgs, print_stage_commands};
use crate::exit;
use crate::output::{OutputFormat, format_duration, print_info, print_json, print_stat, print_success, print_warning};

#[derive(Args, Debug)]
pub struct BuildArgs {
  #[command(flatten)]
  pub selection: SelectionArgs,

  /// Solver source tree containing the top-level CMakeLists.txt
  #[arg(long)]
  pub source: PathBuf,

  /// Scratch build directory (default: <source>/build)
  #[arg(long)]
  pub build_dir: Option<PathBuf>,

  /// Show the plan and stage commands without running anything
  #[arg(long)]
  pub dry_run: bool,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  pub output: OutputFormat,
}

/// Run the pipeline. Returns the exit code for a run that reached Install.
pub fn cmd_build(config: &Config, args: &BuildArgs) -> Result<u8> {
  let source = dunce::canonicalize(&args.source)
    .with_context(|| format!("Source directory not found: {}", args.source.display()))?;
  let mut dirs = BuildDirs::in_source(source);
  if let Some(build_dir) = &args.build_dir {
    dirs.build = std::path::absolute(build_dir)
      .with_context(|| format!("Invalid build directory: {}", build_dir.display()))?;
  }

  let plan = args.selection.plan(config)?;

  if args.dry_run {
    if args.output.is_json() {
      print_json(&serde_json::json!({ "plan": plan, "source": dirs.source, "build": dirs.build }))?;
    } else {
      print_plan(&plan)?;
      println!();
      print_stage_commands(&plan, &dirs, config);
      println!();
      print_info("Dry run - nothing was built");
    }
    return Ok(exit::OK);
  }

  // Tool output would corrupt JSON on stdout, so it is only shown for text.
  let runner = ProcessRunner::new(!args.output.is_json());
  let orchestrator = Orchestrator::new(&runner, config.tools.clone()).with_provisioner(config.provision.clone());

  info!(prefix = %plan.install_prefix.display(), "building");
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(orchestrator.run(&plan, &dirs)).context("Build failed")?;

  if args.output.is_json() {
    print_json(&report)?;
  } else {
    print_report(&report, &plan.install_prefix.display().to_string());
  }

  Ok(match report.verify {
    VerifyOutcome::Failed { .. } | VerifyOutcome::NotStarted => exit::VERIFY,
    VerifyOutcome::Passed | VerifyOutcome::Skipped => exit::OK,
  })
}

fn print_report(report: &BuildReport, prefix: &str) {
  println!();
  for record in &report.stages {
    let state = match record.state {
      StageState::Succeeded => "ok".to_string(),
      StageState::Failed { code } => format!("failed ({})", code.map_or("signal".to_string(), |c| c.to_string())),
      StageState::Pending | StageState::Running => "incomplete".to_string(),
    };
    print_stat(
      record.stage.as_str(),
      &format!("{} in {}", state, format_duration(record.elapsed)),
    );
  }

  match report.verify {
    VerifyOutcome::Failed { .. } => {
      print_warning(&format!("Quick tests failed; the installation at {} was kept", prefix));
    }
    VerifyOutcome::NotStarted => {
      print_warning(&format!(
        "Quick tests could not be started; the installation at {} was kept",
        prefix
      ));
    }
    VerifyOutcome::Passed | VerifyOutcome::Skipped => {
      print_success(&format!(
        "Installed to {} in {}",
        prefix,
        format_duration(report.elapsed)
      ));
    }
  }
}
