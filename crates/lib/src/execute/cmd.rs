//! External process execution.
//!
//! Every stage of the pipeline and every smoke-test step is one blocking
//! process run. The [`CommandRunner`] seam lets the orchestrator be driven by
//! a scripted runner in tests.

use std::future::Future;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use super::types::{ExecuteError, Invocation, ProcessOutcome};

/// Runs external commands to completion.
pub trait CommandRunner {
  fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<ProcessOutcome, ExecuteError>> + Send;
}

/// Spawns real processes with `tokio::process`.
///
/// The child inherits the parent environment plus the invocation's variables.
/// With `inherit_output` the child writes straight to the terminal; otherwise
/// output is captured and only logged when the command fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
  pub inherit_output: bool,
}

impl ProcessRunner {
  pub fn new(inherit_output: bool) -> Self {
    Self { inherit_output }
  }
}

impl CommandRunner for ProcessRunner {
  async fn run(&self, invocation: &Invocation) -> Result<ProcessOutcome, ExecuteError> {
    info!(cmd = %invocation, "executing command");

    let mut command = Command::new(&invocation.program);
    command
      .args(&invocation.args)
      .current_dir(&invocation.cwd)
      .envs(&invocation.env)
      .stdin(Stdio::null());

    debug!(working_dir = ?invocation.cwd, env = ?invocation.env, "spawning process");

    let spawn_err = |source| ExecuteError::Spawn {
      program: invocation.program.clone(),
      source,
    };

    let outcome = if self.inherit_output {
      let status = command
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(spawn_err)?;
      ProcessOutcome { code: status.code() }
    } else {
      let output = command.output().await.map_err(spawn_err)?;
      if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stderr.is_empty() {
          debug!(stderr = %stderr, "command stderr");
        }
        if !stdout.is_empty() {
          debug!(stdout = %stdout, "command stdout");
        }
      }
      ProcessOutcome {
        code: output.status.code(),
      }
    };

    debug!(code = ?outcome.code, "process exited");
    Ok(outcome)
  }
}
