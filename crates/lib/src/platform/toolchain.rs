//! Toolchain availability detection.
//!
//! Probes `PATH` for the compilers and build tools the payload needs. Detection
//! only records what is present; missing tools surface later when Configure runs.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A toolchain component that may be available on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainId {
  Cc,
  Cxx,
  Fortran,
  CMake,
  Make,
  CTest,
}

impl ToolchainId {
  pub const ALL: [ToolchainId; 6] = [
    ToolchainId::Cc,
    ToolchainId::Cxx,
    ToolchainId::Fortran,
    ToolchainId::CMake,
    ToolchainId::Make,
    ToolchainId::CTest,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Cc => "cc",
      Self::Cxx => "c++",
      Self::Fortran => "fortran",
      Self::CMake => "cmake",
      Self::Make => "make",
      Self::CTest => "ctest",
    }
  }

  /// Executable names that provide this component, in preference order.
  pub fn candidates(&self) -> &'static [&'static str] {
    match self {
      Self::Cc => &["cc", "gcc", "clang"],
      Self::Cxx => &["c++", "g++", "clang++"],
      Self::Fortran => &["gfortran", "flang"],
      Self::CMake => &["cmake"],
      Self::Make => &["make", "gmake"],
      Self::CTest => &["ctest"],
    }
  }
}

impl fmt::Display for ToolchainId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Detect which toolchain components are reachable through the given search path.
pub fn detect_toolchains(search_path: Option<&OsStr>) -> BTreeSet<ToolchainId> {
  let dirs: Vec<PathBuf> = search_path.map(|p| std::env::split_paths(p).collect()).unwrap_or_default();

  ToolchainId::ALL
    .into_iter()
    .filter(|id| {
      let found = id
        .candidates()
        .iter()
        .find_map(|name| dirs.iter().map(|d| d.join(name)).find(|p| is_executable(p)));
      debug!(toolchain = %id, found = ?found, "probed toolchain");
      found.is_some()
    })
    .collect()
}

/// Check whether a path is a regular file with an execute bit set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
  use std::os::unix::fs::PermissionsExt;

  path
    .metadata()
    .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
    .unwrap_or(false)
}

/// Check whether a path is a regular file.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
  path.is_file()
}
