//! Build orchestration.
//!
//! Drives the native build tools through Configure, Compile, Install and, when
//! testing was requested, Verify. Each stage is one process run inside the
//! scratch build directory and starts only after its predecessor succeeded.
//! Configure, Compile and Install failures abort immediately; a Verify failure
//! is reported but the installed tree is left in place. Nothing is retried and
//! no timeout is imposed.

pub mod stage;
pub mod types;

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::consts::QUICK_TEST_LABEL;
use crate::execute::{CommandRunner, Invocation};
use crate::plan::BuildPlan;

pub use stage::{BuildStage, StageRecord, StageState, StageTracker};
pub use types::{BuildError, BuildReport, Tools, VerifyOutcome};

/// Where a build happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDirs {
  /// Unpacked payload source tree (holds the top-level CMakeLists.txt).
  pub source: PathBuf,
  /// Scratch directory for one Configure/Compile/Install cycle.
  pub build: PathBuf,
}

impl BuildDirs {
  /// Scratch directory `build/` inside the source tree.
  pub fn in_source(source: impl Into<PathBuf>) -> Self {
    let source = source.into();
    let build = source.join(crate::consts::BUILD_DIR_NAME);
    Self { source, build }
  }
}

/// Runs the build pipeline with a given [`CommandRunner`].
pub struct Orchestrator<'a, R: CommandRunner> {
  runner: &'a R,
  tools: Tools,
  provisioner: Option<Vec<String>>,
}

impl<'a, R: CommandRunner + Sync> Orchestrator<'a, R> {
  pub fn new(runner: &'a R, tools: Tools) -> Self {
    Self {
      runner,
      tools,
      provisioner: None,
    }
  }

  /// Install resolved dependencies with an external command before Configure.
  ///
  /// The dependency ids are appended to `command` as arguments.
  pub fn with_provisioner(mut self, command: Vec<String>) -> Self {
    self.provisioner = Some(command).filter(|c| !c.is_empty());
    self
  }

  /// The invocation each stage runs.
  pub fn invocation(&self, stage: BuildStage, plan: &BuildPlan, dirs: &BuildDirs) -> Invocation {
    match stage {
      BuildStage::Configure => {
        let toolchain_env = plan.toolchain.as_ref().map(|t| t.env()).unwrap_or_default();
        Invocation::new(&self.tools.cmake, &dirs.build)
          .arg(dirs.source.to_string_lossy())
          .args(plan.flags.to_args())
          .envs(toolchain_env)
      }
      BuildStage::Compile => Invocation::new(&self.tools.make, &dirs.build),
      BuildStage::Install => Invocation::new(&self.tools.make, &dirs.build).arg("install"),
      BuildStage::Verify => Invocation::new(&self.tools.ctest, &dirs.build)
        .arg("-L")
        .arg(QUICK_TEST_LABEL),
    }
  }

  /// Run the whole pipeline for a plan.
  pub async fn run(&self, plan: &BuildPlan, dirs: &BuildDirs) -> Result<BuildReport, BuildError> {
    let started = Instant::now();
    info!(source = %dirs.source.display(), build = %dirs.build.display(), "starting build");

    prepare_build_dir(&dirs.build).await?;

    if let Some(command) = &self.provisioner {
      self.provision(command, plan, &dirs.build).await?;
    }

    let mut tracker = StageTracker::new();
    for stage in [BuildStage::Configure, BuildStage::Compile, BuildStage::Install] {
      let state = self.run_stage(&mut tracker, stage, plan, dirs).await?;
      if let StageState::Failed { code } = state {
        return Err(BuildError::StageFailed { stage, code });
      }
    }

    let verify = if plan.verify {
      match self.run_stage(&mut tracker, BuildStage::Verify, plan, dirs).await {
        Ok(StageState::Failed { code }) => {
          warn!(code = ?code, "quick test suite failed, install kept");
          VerifyOutcome::Failed { code }
        }
        Ok(_) => VerifyOutcome::Passed,
        Err(BuildError::StageSpawn { source, .. }) => {
          warn!(error = %source, "quick test suite could not start, install kept");
          VerifyOutcome::NotStarted
        }
        Err(err) => return Err(err),
      }
    } else {
      VerifyOutcome::Skipped
    };

    let report = BuildReport {
      stages: tracker.into_records(),
      verify,
      elapsed: started.elapsed(),
    };
    info!(success = report.is_success(), "build finished");
    Ok(report)
  }

  async fn run_stage(
    &self,
    tracker: &mut StageTracker,
    stage: BuildStage,
    plan: &BuildPlan,
    dirs: &BuildDirs,
  ) -> Result<StageState, BuildError> {
    tracker.enter(stage)?;
    info!(stage = %stage, "entering stage");

    let invocation = self.invocation(stage, plan, dirs);
    let started = Instant::now();
    let outcome = self
      .runner
      .run(&invocation)
      .await
      .map_err(|source| BuildError::StageSpawn { stage, source })?;

    let state = tracker.finish(stage, outcome.code, started.elapsed());
    info!(stage = %stage, state = ?state, "stage finished");
    Ok(state)
  }

  async fn provision(&self, command: &[String], plan: &BuildPlan, cwd: &Path) -> Result<(), BuildError> {
    let Some((program, args)) = command.split_first() else {
      return Ok(());
    };
    let invocation = Invocation::new(program.as_str(), cwd)
      .args(args.iter().cloned())
      .args(plan.package_ids());

    info!(packages = ?plan.package_ids(), "provisioning dependencies");
    let outcome = self.runner.run(&invocation).await.map_err(BuildError::ProvisionSpawn)?;
    if !outcome.success() {
      return Err(BuildError::ProvisionFailed { code: outcome.code });
    }
    Ok(())
  }
}

async fn prepare_build_dir(path: &Path) -> Result<(), BuildError> {
  tokio::fs::create_dir_all(path).await.map_err(|source| BuildError::BuildDir {
    path: path.to_path_buf(),
    source,
  })
}
