//! Versioned compiler discovery.
//!
//! Providers such as Homebrew's gcc install `gcc-13`, `g++-13` and `gfortran-13`
//! rather than plain `gcc`. When discovery is requested, the first version (in
//! lexical order) that has both a C and a C++ compiler becomes the toolchain
//! override for Configure.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::platform::toolchain::is_executable;

/// Compilers to hand to the Configure process through its environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainOverride {
  pub version: String,
  pub cc: PathBuf,
  pub cxx: PathBuf,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fortran: Option<PathBuf>,
}

impl ToolchainOverride {
  /// Environment variables applied to the Configure process only.
  pub fn env(&self) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("CC".to_string(), self.cc.to_string_lossy().to_string());
    env.insert("CXX".to_string(), self.cxx.to_string_lossy().to_string());
    if let Some(fc) = &self.fortran {
      env.insert("FC".to_string(), fc.to_string_lossy().to_string());
    }
    env
  }
}

/// Version suffix of a `gcc-<version>` executable name.
fn gcc_version(name: &str) -> Option<&str> {
  let version = name.strip_prefix("gcc-")?;
  let valid = !version.is_empty()
    && version.starts_with(|c: char| c.is_ascii_digit())
    && version.chars().all(|c| c.is_ascii_digit() || c == '.');
  valid.then_some(version)
}

/// Probe a provider's `bin` directory for a matching versioned compiler pair.
///
/// Returns `None` when the directory is unreadable or holds no pair; callers
/// then fall back to the system default toolchain.
pub fn discover_compilers(bin_dir: &Path) -> Option<ToolchainOverride> {
  let entries = match std::fs::read_dir(bin_dir) {
    Ok(entries) => entries,
    Err(e) => {
      debug!(dir = %bin_dir.display(), error = %e, "compiler probe directory unreadable");
      return None;
    }
  };

  let mut names: Vec<String> = entries
    .filter_map(|e| e.ok())
    .filter_map(|e| e.file_name().into_string().ok())
    .collect();
  names.sort();

  let found = names.iter().filter_map(|name| gcc_version(name)).find_map(|version| {
    let cc = bin_dir.join(format!("gcc-{version}"));
    let cxx = bin_dir.join(format!("g++-{version}"));
    if !is_executable(&cc) || !is_executable(&cxx) {
      return None;
    }
    let fortran = Some(bin_dir.join(format!("gfortran-{version}"))).filter(|p| is_executable(p));
    Some(ToolchainOverride {
      version: version.to_string(),
      cc,
      cxx,
      fortran,
    })
  });

  match &found {
    Some(toolchain) => debug!(version = %toolchain.version, "discovered versioned compilers"),
    None => debug!(dir = %bin_dir.display(), "no versioned compiler pair found, using system default"),
  }
  found
}
