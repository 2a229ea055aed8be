//! Post-install smoke tests.
//!
//! Runs a [`SmokeSuite`] against an installed tree: the fixtures are written
//! into an isolated scratch directory, each step runs one installed program
//! there, and the suite passes when every step exits zero and the result
//! marker holds exactly the expected content. The harness knows nothing about
//! what the fixtures contain.

pub mod suite;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info};

use crate::execute::{CommandRunner, ExecuteError, Invocation, describe_exit};
use crate::util::hash::{hash_bytes, hash_file};

pub use suite::{FixtureFile, MarkerCheck, SmokeStep, SmokeSuite};

#[derive(Debug, Error)]
pub enum SmokeError {
  #[error("invalid smoke suite {path}: {message}")]
  Load { path: PathBuf, message: String },

  /// A caller-supplied scratch directory must start out empty.
  #[error("scratch directory {path} is not empty")]
  ScratchNotEmpty { path: PathBuf },

  #[error("i/o error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A fixture on disk differs from the content that was written.
  #[error("fixture {path} does not match its source after writing")]
  FixtureCorrupted { path: PathBuf },

  #[error("{program} exited with {}", describe_exit(.code))]
  StepFailed { program: String, code: Option<i32> },

  #[error("{program} could not start: {source}")]
  StepSpawn {
    program: String,
    #[source]
    source: ExecuteError,
  },

  #[error("result marker {path} was not produced")]
  MarkerMissing { path: PathBuf },

  #[error("result marker holds {actual:?}, expected {expected:?}")]
  MarkerMismatch { expected: String, actual: String },
}

/// Outcome of a passing smoke test.
#[derive(Debug, Clone, Serialize)]
pub struct SmokeReport {
  pub suite: String,
  /// Scratch directory the steps ran in. Removed on return unless supplied by the caller.
  pub scratch: PathBuf,
  pub steps: Vec<StepRecord>,
  pub elapsed: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
  pub command: String,
  pub elapsed: Duration,
}

/// Run a suite with programs from `bin_dir`.
///
/// With `scratch` the steps run in that directory, which is created if needed
/// and left in place; it must be empty so nothing from an earlier run can
/// satisfy the marker check. Otherwise a fresh temporary directory is used and
/// removed afterwards.
pub async fn run_smoke_test<R>(
  suite: &SmokeSuite,
  bin_dir: &Path,
  scratch: Option<&Path>,
  runner: &R,
) -> Result<SmokeReport, SmokeError>
where
  R: CommandRunner + Sync,
{
  let started = Instant::now();

  let temp;
  let dir = match scratch {
    Some(dir) => {
      prepare_scratch(dir)?;
      dir.to_path_buf()
    }
    None => {
      temp = TempDir::with_prefix("fembuild-smoke-").map_err(|source| SmokeError::Io {
        path: std::env::temp_dir(),
        source,
      })?;
      temp.path().to_path_buf()
    }
  };
  info!(suite = %suite.name, scratch = %dir.display(), "starting smoke test");

  for fixture in &suite.fixtures {
    write_fixture(&dir, fixture)?;
  }

  let mut steps = Vec::with_capacity(suite.steps.len());
  for step in &suite.steps {
    let invocation = Invocation::new(bin_dir.join(&step.program).to_string_lossy(), &dir).args(step.args.iter().cloned());
    info!(step = %invocation, "running smoke step");

    let step_started = Instant::now();
    let outcome = runner.run(&invocation).await.map_err(|source| SmokeError::StepSpawn {
      program: step.program.clone(),
      source,
    })?;
    if !outcome.success() {
      return Err(SmokeError::StepFailed {
        program: step.program.clone(),
        code: outcome.code,
      });
    }
    steps.push(StepRecord {
      command: invocation.to_string(),
      elapsed: step_started.elapsed(),
    });
  }

  if let Some(marker) = &suite.marker {
    check_marker(&dir, marker)?;
  }

  info!(suite = %suite.name, "smoke test passed");
  Ok(SmokeReport {
    suite: suite.name.clone(),
    scratch: dir,
    steps,
    elapsed: started.elapsed(),
  })
}

fn prepare_scratch(dir: &Path) -> Result<(), SmokeError> {
  let io_err = |source| SmokeError::Io {
    path: dir.to_path_buf(),
    source,
  };
  fs::create_dir_all(dir).map_err(io_err)?;
  if fs::read_dir(dir).map_err(io_err)?.next().is_some() {
    return Err(SmokeError::ScratchNotEmpty { path: dir.to_path_buf() });
  }
  Ok(())
}

fn write_fixture(dir: &Path, fixture: &FixtureFile) -> Result<(), SmokeError> {
  let path = dir.join(&fixture.path);
  let io_err = |source| SmokeError::Io {
    path: path.clone(),
    source,
  };

  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(io_err)?;
  }
  fs::write(&path, &fixture.content).map_err(io_err)?;

  let written = hash_file(&path).map_err(|e| SmokeError::Io {
    path: path.clone(),
    source: std::io::Error::other(e.message),
  })?;
  if written != hash_bytes(&fixture.content) {
    return Err(SmokeError::FixtureCorrupted { path });
  }
  debug!(fixture = %path.display(), hash = %written, "fixture written");
  Ok(())
}

fn check_marker(dir: &Path, marker: &MarkerCheck) -> Result<(), SmokeError> {
  let path = dir.join(&marker.path);
  let content = match fs::read(&path) {
    Ok(content) => content,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      return Err(SmokeError::MarkerMissing { path });
    }
    Err(source) => return Err(SmokeError::Io { path, source }),
  };

  if content != marker.expected.as_bytes() {
    return Err(SmokeError::MarkerMismatch {
      expected: marker.expected.clone(),
      actual: String::from_utf8_lossy(&content).into_owned(),
    });
  }
  Ok(())
}
