//! Types for external process execution.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while spawning an external process.
///
/// A process that runs and exits non-zero is not an error at this level; it is
/// reported through [`ProcessOutcome`] so callers can attribute it to a stage.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The program could not be started (missing binary, bad cwd, ...).
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },
}

/// A single external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  /// Variables added to the inherited environment.
  pub env: BTreeMap<String, String>,
}

impl Invocation {
  pub fn new(program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.as_ref().to_path_buf(),
      env: BTreeMap::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn envs(mut self, env: BTreeMap<String, String>) -> Self {
    self.env.extend(env);
    self
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.program)?;
    for arg in &self.args {
      write!(f, " {arg}")?;
    }
    Ok(())
  }
}

/// How an external process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
  /// Exit code, `None` when terminated by a signal.
  pub code: Option<i32>,
}

impl ProcessOutcome {
  pub fn exited(code: i32) -> Self {
    Self { code: Some(code) }
  }

  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Human-readable form of an exit code: `exit code 2`, or `a signal` when the
/// process was killed.
pub fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {code}"),
    None => "a signal".to_string(),
  }
}
