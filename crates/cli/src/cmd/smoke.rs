//! Implementation of the `fembuild smoke` command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use fembuild_lib::config::Config;
use fembuild_lib::execute::ProcessRunner;
use fembuild_lib::platform::paths::cache_dir;
use fembuild_lib::smoke::{SmokeSuite, run_smoke_test};

use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success};

#[derive(Args, Debug)]
pub struct SmokeArgs {
  /// Installed bin directory holding the programs under test (default: <prefix>/bin)
  #[arg(long)]
  pub bin_dir: Option<PathBuf>,

  /// Installation prefix, used when --bin-dir is not given
  #[arg(long)]
  pub prefix: Option<PathBuf>,

  /// Suite manifest, or a directory containing suite.toml
  #[arg(long)]
  pub suite: Option<PathBuf>,

  /// Keep the scratch directory under the cache directory
  #[arg(long)]
  pub keep: bool,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  pub output: OutputFormat,
}

pub fn cmd_smoke(config: &Config, args: &SmokeArgs, verbose: bool) -> Result<()> {
  let bin_dir = match (&args.bin_dir, args.prefix.as_ref().or(config.prefix.as_ref())) {
    (Some(bin_dir), _) => bin_dir.clone(),
    (None, Some(prefix)) => prefix.join("bin"),
    (None, None) => bail!("no bin directory: pass --bin-dir or --prefix"),
  };
  let bin_dir = dunce::canonicalize(&bin_dir)
    .with_context(|| format!("Bin directory not found: {}", bin_dir.display()))?;

  let suite_path = match args.suite.as_ref().or(config.smoke.suite.as_ref()) {
    Some(path) => path.clone(),
    None => bail!("no smoke suite: pass --suite or set [smoke] suite in the config file"),
  };
  let suite = SmokeSuite::load(&suite_path)?;

  let scratch = if args.keep { Some(kept_scratch(&suite.name)?) } else { None };

  let runner = ProcessRunner::new(verbose && !args.output.is_json());
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(run_smoke_test(&suite, &bin_dir, scratch.as_deref(), &runner))
    .with_context(|| format!("Smoke test {} failed", suite.name))?;

  if args.output.is_json() {
    print_json(&report)?;
    return Ok(());
  }

  for step in &report.steps {
    print_stat(&step.command, &format_duration(step.elapsed));
  }
  if scratch.is_some() {
    print_stat("Scratch", &report.scratch.display().to_string());
  }
  print_success(&format!(
    "Smoke test {} passed in {}",
    report.suite,
    format_duration(report.elapsed)
  ));
  Ok(())
}

/// A new, uniquely named directory under `<cache>/smoke/` that outlives the run.
fn kept_scratch(suite: &str) -> Result<PathBuf> {
  let root = cache_dir().join("smoke");
  std::fs::create_dir_all(&root).with_context(|| format!("Failed to create {}", root.display()))?;
  let dir = tempfile::Builder::new()
    .prefix(&format!("{suite}-"))
    .tempdir_in(&root)
    .with_context(|| format!("Failed to create scratch directory in {}", root.display()))?;
  Ok(dir.keep())
}
