//! Types for running the build pipeline.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::stage::{BuildStage, StageRecord};
use crate::execute::{ExecuteError, describe_exit};

/// Errors that abort the pipeline.
///
/// A failing Verify stage is not among them: it is reported through
/// [`BuildReport::verify`] and leaves the installed tree in place.
#[derive(Debug, Error)]
pub enum BuildError {
  /// A stage's process exited non-zero or was killed.
  #[error("{stage} failed with {}", describe_exit(.code))]
  StageFailed { stage: BuildStage, code: Option<i32> },

  /// A stage's process could not be started.
  #[error("{stage} could not start: {source}")]
  StageSpawn {
    stage: BuildStage,
    #[source]
    source: ExecuteError,
  },

  /// A stage was entered before its predecessor succeeded.
  #[error("cannot enter {stage}: {previous} has not succeeded")]
  StageOrder { stage: BuildStage, previous: BuildStage },

  #[error("{stage} has already run")]
  StageReentered { stage: BuildStage },

  /// The external dependency provisioner exited non-zero.
  #[error("dependency provisioning failed with {}", describe_exit(.code))]
  ProvisionFailed { code: Option<i32> },

  #[error("dependency provisioner could not start: {0}")]
  ProvisionSpawn(#[source] ExecuteError),

  #[error("failed to prepare build directory {path}: {source}")]
  BuildDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl BuildError {
  /// The stage that failed, if the error is attributable to one.
  pub fn stage(&self) -> Option<BuildStage> {
    match self {
      BuildError::StageFailed { stage, .. }
      | BuildError::StageSpawn { stage, .. }
      | BuildError::StageOrder { stage, .. }
      | BuildError::StageReentered { stage } => Some(*stage),
      BuildError::ProvisionFailed { .. } | BuildError::ProvisionSpawn(_) | BuildError::BuildDir { .. } => None,
    }
  }
}

/// Names of the native build tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tools {
  pub cmake: String,
  pub make: String,
  pub ctest: String,
}

impl Default for Tools {
  fn default() -> Self {
    Self {
      cmake: "cmake".to_string(),
      make: "make".to_string(),
      ctest: "ctest".to_string(),
    }
  }
}

/// Result of the quick test suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum VerifyOutcome {
  /// Testing was not requested.
  Skipped,
  Passed,
  /// The suite failed; the install is kept.
  Failed { code: Option<i32> },
  /// The test driver could not be started; the install is kept.
  NotStarted,
}

/// Summary of a pipeline run that reached Install.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub stages: Vec<StageRecord>,
  pub verify: VerifyOutcome,
  pub elapsed: Duration,
}

impl BuildReport {
  /// True unless the quick test suite failed or could not run.
  pub fn is_success(&self) -> bool {
    matches!(self.verify, VerifyOutcome::Passed | VerifyOutcome::Skipped)
  }
}
