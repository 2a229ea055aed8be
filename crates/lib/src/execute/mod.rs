//! External process execution.
//!
//! Provides the [`CommandRunner`] seam used by the build orchestrator and the
//! smoke-test harness, and the [`ProcessRunner`] that spawns real processes.

pub mod cmd;
pub mod types;

pub use cmd::{CommandRunner, ProcessRunner};
pub use types::{ExecuteError, Invocation, ProcessOutcome, describe_exit};
