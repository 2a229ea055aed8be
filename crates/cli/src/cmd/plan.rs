//! Implementation of the `fembuild plan` command.
//!
//! Resolves dependencies and compiles flags for the given options without
//! running anything.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use fembuild_lib::config::Config;
use fembuild_lib::orchestrate::BuildDirs;
use fembuild_lib::plan::BuildPlan;
use fembuild_lib::util::hash::Hashable;

use super::{SelectionArgs, print_stage_commands};
use crate::output::{OutputFormat, print_json, print_list, print_stat};

#[derive(Args, Debug)]
pub struct PlanArgs {
  #[command(flatten)]
  pub selection: SelectionArgs,

  /// Solver source tree; when given, the stage commands are shown too
  #[arg(long)]
  pub source: Option<PathBuf>,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  pub output: OutputFormat,
}

pub fn cmd_plan(config: &Config, args: &PlanArgs) -> Result<()> {
  let plan = args.selection.plan(config)?;
  let dirs = args.source.clone().map(BuildDirs::in_source);

  if args.output.is_json() {
    let fingerprint = plan.compute_hash().context("Failed to compute plan fingerprint")?;
    print_json(&serde_json::json!({ "fingerprint": fingerprint, "plan": plan }))?;
    return Ok(());
  }

  print_plan(&plan)?;
  if let Some(dirs) = dirs {
    println!();
    print_stage_commands(&plan, &dirs, config);
  }
  Ok(())
}

/// Human-readable summary shared with `build --dry-run`.
pub fn print_plan(plan: &BuildPlan) -> Result<()> {
  let fingerprint = plan.compute_hash().context("Failed to compute plan fingerprint")?;

  println!("Plan: {}", fingerprint);
  print_stat("Platform", &plan.platform.triple());
  print_stat("Prefix", &plan.install_prefix.display().to_string());
  print_stat("Verify", if plan.verify { "ctest -L quick" } else { "skipped" });
  println!();

  print_list(
    &format!("Dependencies: {}", plan.dependencies.len()),
    plan.dependencies.iter().map(|dep| match dep.variant {
      Some(variant) => format!("{} ({}, {})", dep.id, dep.requirement, variant),
      None => format!("{} ({})", dep.id, dep.requirement),
    }),
  );

  let dropped = plan.dependencies.dropped();
  if !dropped.is_empty() {
    print_list(
      "Dropped:",
      dropped
        .iter()
        .map(|d| format!("{} ({} conflict, {} kept)", d.id, d.family, d.kept)),
    );
  }
  println!();

  print_list(&format!("Flags: {}", plan.flags.len()), plan.flags.to_args());

  if let Some(toolchain) = &plan.toolchain {
    println!();
    print_list(
      &format!("Toolchain (gcc {}):", toolchain.version),
      toolchain.env().into_iter().map(|(k, v)| format!("{k}={v}")),
    );
  }
  Ok(())
}
