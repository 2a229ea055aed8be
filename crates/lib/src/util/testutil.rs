//! Test utilities for fembuild-lib.
//!
//! Shell helpers for tests that spawn real processes, and a scripted
//! [`CommandRunner`] that records invocations without spawning anything.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::execute::{CommandRunner, ExecuteError, Invocation, ProcessOutcome};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

/// Write an executable shell script into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Runner that records every invocation and answers with scripted exit codes.
///
/// Exit codes are keyed either by the exact command line (`"make install"`) or
/// by program name; anything unscripted exits 0.
#[derive(Default)]
pub struct ScriptedRunner {
  lines: HashMap<String, i32>,
  programs: HashMap<String, i32>,
  calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn fail(mut self, command_line: &str, code: i32) -> Self {
    self.lines.insert(command_line.to_string(), code);
    self
  }

  pub fn fail_program(mut self, program: &str, code: i32) -> Self {
    self.programs.insert(program.to_string(), code);
    self
  }

  pub fn calls(&self) -> Vec<Invocation> {
    self.calls.lock().unwrap().clone()
  }

  /// Number of recorded invocations of a program.
  pub fn count(&self, program: &str) -> usize {
    self.calls.lock().unwrap().iter().filter(|i| i.program == program).count()
  }

  /// Number of recorded invocations with exactly this command line.
  pub fn count_line(&self, command_line: &str) -> usize {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .filter(|i| i.to_string() == command_line)
      .count()
  }
}

impl CommandRunner for ScriptedRunner {
  async fn run(&self, invocation: &Invocation) -> Result<ProcessOutcome, ExecuteError> {
    self.calls.lock().unwrap().push(invocation.clone());
    let code = self
      .lines
      .get(&invocation.to_string())
      .or_else(|| self.programs.get(&invocation.program))
      .copied()
      .unwrap_or(0);
    Ok(ProcessOutcome::exited(code))
  }
}
