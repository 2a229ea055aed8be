mod build;
mod info;
mod options;
mod plan;
mod smoke;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use fembuild_lib::config::Config;
use fembuild_lib::deps::PrefixLocator;
use fembuild_lib::execute::ProcessRunner;
use fembuild_lib::options::{Feature, OptionSet};
use fembuild_lib::orchestrate::{BuildDirs, BuildStage, Orchestrator};
use fembuild_lib::plan::BuildPlan;
use fembuild_lib::platform::PlatformFacts;

use crate::output::print_list;

pub use build::{BuildArgs, cmd_build};
pub use info::cmd_info;
pub use options::cmd_options;
pub use plan::{PlanArgs, cmd_plan};
pub use smoke::{SmokeArgs, cmd_smoke};

/// Option and location arguments shared by `plan` and `build`.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
  /// Enable an option (repeatable), e.g. --with elmergui
  #[arg(long = "with", value_name = "OPTION")]
  pub with: Vec<Feature>,

  /// Disable an option (repeatable), e.g. --without mpi
  #[arg(long = "without", value_name = "OPTION")]
  pub without: Vec<Feature>,

  /// Option tokens in with-NAME / without-NAME form, applied before --with/--without
  #[arg(value_name = "TOKEN")]
  pub tokens: Vec<String>,

  /// Installation prefix
  #[arg(long)]
  pub prefix: Option<PathBuf>,

  /// Root under which dependency packages live as opt/<id>
  #[arg(long)]
  pub packages_root: Option<PathBuf>,
}

impl SelectionArgs {
  /// Config-file choices, then tokens in order, then the explicit lists.
  pub fn option_set(&self, config: &Config) -> Result<OptionSet> {
    let mut options = config.option_set();
    for token in &self.tokens {
      let (feature, choice) = OptionSet::parse_token(token)?;
      options.set(feature, choice);
    }
    options.apply_lists(&self.with, &self.without)?;
    Ok(options)
  }

  pub fn prefix(&self, config: &Config) -> Result<PathBuf> {
    match self.prefix.clone().or_else(|| config.prefix.clone()) {
      Some(prefix) => std::path::absolute(&prefix).with_context(|| format!("Invalid prefix: {}", prefix.display())),
      None => bail!("no install prefix: pass --prefix, set FEMBUILD_PREFIX or add prefix to the config file"),
    }
  }

  /// Resolve and compile a plan for the running host.
  pub fn plan(&self, config: &Config) -> Result<BuildPlan> {
    let options = self.option_set(config)?;
    let prefix = self.prefix(config)?;
    let platform = PlatformFacts::detect().context("Failed to detect platform")?;
    let root = self.packages_root.clone().unwrap_or_else(|| config.packages_root());
    let locator = PrefixLocator::new(root);

    Ok(BuildPlan::new(
      options,
      platform,
      &locator,
      prefix,
      &config.compile_settings(),
    ))
  }
}

/// Print the command line every stage would run.
pub fn print_stage_commands(plan: &BuildPlan, dirs: &BuildDirs, config: &Config) {
  let runner = ProcessRunner::default();
  let orchestrator = Orchestrator::new(&runner, config.tools.clone());
  let stages = BuildStage::ALL
    .into_iter()
    .filter(|stage| *stage != BuildStage::Verify || plan.verify)
    .map(|stage| format!("{:<9} {}", stage.as_str(), orchestrator.invocation(stage, plan, dirs)));
  print_list(&format!("Stages (in {}):", dirs.build.display()), stages);
}
