//! The linear build stage machine.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::types::BuildError;

/// One step of the build pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStage {
  Configure,
  Compile,
  Install,
  Verify,
}

impl BuildStage {
  pub const ALL: [BuildStage; 4] = [
    BuildStage::Configure,
    BuildStage::Compile,
    BuildStage::Install,
    BuildStage::Verify,
  ];

  /// The stage that must have succeeded before this one may start.
  pub fn previous(&self) -> Option<BuildStage> {
    match self {
      BuildStage::Configure => None,
      BuildStage::Compile => Some(BuildStage::Configure),
      BuildStage::Install => Some(BuildStage::Compile),
      BuildStage::Verify => Some(BuildStage::Install),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      BuildStage::Configure => "configure",
      BuildStage::Compile => "compile",
      BuildStage::Install => "install",
      BuildStage::Verify => "verify",
    }
  }

  fn index(&self) -> usize {
    *self as usize
  }
}

impl fmt::Display for BuildStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StageState {
  Pending,
  Running,
  Succeeded,
  Failed { code: Option<i32> },
}

/// Completed stage with its timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
  pub stage: BuildStage,
  pub state: StageState,
  pub elapsed: Duration,
}

/// Tracks stage states and refuses out-of-order transitions.
#[derive(Debug, Clone)]
pub struct StageTracker {
  states: [StageState; 4],
  records: Vec<StageRecord>,
}

impl Default for StageTracker {
  fn default() -> Self {
    Self {
      states: [StageState::Pending; 4],
      records: Vec::new(),
    }
  }
}

impl StageTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self, stage: BuildStage) -> StageState {
    self.states[stage.index()]
  }

  /// Mark a stage as running. Its predecessor must have succeeded and the stage
  /// must not have run before.
  pub fn enter(&mut self, stage: BuildStage) -> Result<(), BuildError> {
    if let Some(previous) = stage.previous()
      && self.state(previous) != StageState::Succeeded
    {
      return Err(BuildError::StageOrder { stage, previous });
    }
    if self.state(stage) != StageState::Pending {
      return Err(BuildError::StageReentered { stage });
    }
    self.states[stage.index()] = StageState::Running;
    Ok(())
  }

  /// Record how a running stage ended.
  pub fn finish(&mut self, stage: BuildStage, code: Option<i32>, elapsed: Duration) -> StageState {
    let state = if code == Some(0) {
      StageState::Succeeded
    } else {
      StageState::Failed { code }
    };
    self.states[stage.index()] = state;
    self.records.push(StageRecord { stage, state, elapsed });
    state
  }

  pub fn records(&self) -> &[StageRecord] {
    &self.records
  }

  pub fn into_records(self) -> Vec<StageRecord> {
    self.records
  }
}
