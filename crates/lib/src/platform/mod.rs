//! Platform facts consumed by dependency resolution and flag compilation.
//!
//! `PlatformFacts` is gathered once per invocation and never mutated afterwards.

pub mod os;
pub mod paths;
pub mod toolchain;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use os::{Arch, Os};
pub use toolchain::{ToolchainId, detect_toolchains};

#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("unsupported operating system: {0}")]
  UnsupportedOs(String),

  #[error("unsupported architecture: {0}")]
  UnsupportedArch(String),
}

/// Environment-derived facts about the build host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFacts {
  pub os: Os,
  pub arch: Arch,
  /// Shared library suffix without the dot (`so`, `dylib`).
  pub shared_lib_extension: String,
  pub available_toolchains: BTreeSet<ToolchainId>,
}

impl PlatformFacts {
  /// Facts for a known OS/arch pair with no detected toolchains.
  pub fn new(os: Os, arch: Arch) -> Self {
    Self {
      os,
      arch,
      shared_lib_extension: os.shared_lib_extension().to_string(),
      available_toolchains: BTreeSet::new(),
    }
  }

  pub fn with_toolchains(mut self, toolchains: impl IntoIterator<Item = ToolchainId>) -> Self {
    self.available_toolchains = toolchains.into_iter().collect();
    self
  }

  /// Detect the facts of the running host, probing `PATH` for toolchains.
  pub fn detect() -> Result<Self, PlatformError> {
    let os = Os::current().ok_or_else(|| PlatformError::UnsupportedOs(std::env::consts::OS.to_string()))?;
    let arch = Arch::current().ok_or_else(|| PlatformError::UnsupportedArch(std::env::consts::ARCH.to_string()))?;
    let path = std::env::var_os("PATH");
    Ok(Self::new(os, arch).with_toolchains(detect_toolchains(path.as_deref())))
  }

  pub fn has_toolchain(&self, id: ToolchainId) -> bool {
    self.available_toolchains.contains(&id)
  }

  /// Returns the platform triple string (e.g., "aarch64-darwin")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for PlatformFacts {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}
