//! CMake flag compilation.
//!
//! Translates the option set, platform facts and resolved dependencies into the
//! `-D<key>=<value>` entries consumed by the solver's CMake build. Keys are kept
//! verbatim. The list is append-only: a key may appear more than once, and the
//! last occurrence wins when CMake reads the cache.

pub mod toolchain;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::deps::{DependencySet, PackageLocator, ids};
use crate::options::{Feature, OptionSet};
use crate::platform::{Os, PlatformFacts};

pub use toolchain::{ToolchainOverride, discover_compilers};

/// Flag keys understood by the solver's CMake build.
pub mod keys {
  pub const INSTALL_PREFIX: &str = "CMAKE_INSTALL_PREFIX";
  pub const WITH_HYPRE: &str = "WITH_Hypre:BOOL";
  pub const WITH_ELMERICE: &str = "WITH_ElmerIce:BOOL";
  pub const WITH_MUMPS: &str = "WITH_Mumps:BOOL";
  pub const WITH_MPI: &str = "WITH_MPI:BOOL";
  pub const WITH_OPENMP: &str = "WITH_OpenMP:BOOL";
  pub const BLAS_LIBRARIES: &str = "BLAS_LIBRARIES:STRING";
  pub const LAPACK_LIBRARIES: &str = "LAPACK_LIBRARIES:STRING";
  pub const WITH_ELMERGUI: &str = "WITH_ELMERGUI:BOOL";
  pub const WITH_QWT: &str = "WITH_QWT:BOOL";
  pub const WITH_OCC: &str = "WITH_OCC:BOOL";
  pub const WITH_VTK: &str = "WITH_VTK:BOOL";
  pub const QWT_INCLUDE_DIR: &str = "QWT_INCLUDE_DIR";
  pub const WITH_QT5: &str = "WITH_QT5:BOOL";
  pub const BUILD_TYPE: &str = "CMAKE_BUILD_TYPE";
  pub const VERBOSE_MAKEFILE: &str = "CMAKE_VERBOSE_MAKEFILE";
  pub const FIND_FRAMEWORK: &str = "CMAKE_FIND_FRAMEWORK";

  /// Keys only emitted when the GUI is built.
  pub const GUI: &[&str] = &[WITH_ELMERGUI, WITH_QWT, WITH_OCC, WITH_VTK, QWT_INCLUDE_DIR, WITH_QT5];
}

const TRUE: &str = "TRUE";
const FALSE: &str = "FALSE";

/// Linker suffix required by the threaded BLAS/LAPACK backend on every platform.
const THREAD_LINK_SUFFIX: &str = ";-lpthread";

/// Order in which the 1:1 feature toggles are emitted.
const TOGGLE_ORDER: [Feature; 5] = [
  Feature::Hypre,
  Feature::ElmerIce,
  Feature::Mumps,
  Feature::Mpi,
  Feature::OpenMp,
];

/// One CMake cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagEntry {
  pub key: String,
  pub value: String,
}

impl FlagEntry {
  pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      value: value.into(),
    }
  }

  /// Command-line form passed to CMake.
  pub fn to_arg(&self) -> String {
    format!("-D{}={}", self.key, self.value)
  }
}

impl fmt::Display for FlagEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_arg())
  }
}

/// Append-only flag sequence with last-write-wins lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagList(Vec<FlagEntry>);

impl FlagList {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.push(FlagEntry::new(key, value));
  }

  /// Effective value of a key: its last occurrence.
  pub fn last(&self, key: &str) -> Option<&str> {
    self.0.iter().rev().find(|e| e.key == key).map(|e| e.value.as_str())
  }

  pub fn count(&self, key: &str) -> usize {
    self.0.iter().filter(|e| e.key == key).count()
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.0.iter().any(|e| e.key == key)
  }

  /// Index of the first occurrence of a key.
  pub fn position(&self, key: &str) -> Option<usize> {
    self.0.iter().position(|e| e.key == key)
  }

  pub fn iter(&self) -> impl Iterator<Item = &FlagEntry> {
    self.0.iter()
  }

  pub fn to_args(&self) -> Vec<String> {
    self.0.iter().map(FlagEntry::to_arg).collect()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Settings that shape the standard CMake arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileSettings {
  pub build_type: String,
}

impl Default for CompileSettings {
  fn default() -> Self {
    Self {
      build_type: "Release".to_string(),
    }
  }
}

/// Output of the flag compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledFlags {
  pub flags: FlagList,
  /// Applied to the Configure process environment only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub toolchain: Option<ToolchainOverride>,
}

fn toggle_key(feature: Feature) -> Option<&'static str> {
  match feature {
    Feature::Hypre => Some(keys::WITH_HYPRE),
    Feature::ElmerIce => Some(keys::WITH_ELMERICE),
    Feature::Mumps => Some(keys::WITH_MUMPS),
    Feature::Mpi => Some(keys::WITH_MPI),
    Feature::OpenMp => Some(keys::WITH_OPENMP),
    Feature::ElmerGui | Feature::Qt5 | Feature::Testing | Feature::DiscoverCompilers => None,
  }
}

/// Whether a declined feature must still be stated, because the payload's own
/// default for it would otherwise decide.
fn explicit_when_declined(feature: Feature) -> bool {
  matches!(feature, Feature::Mpi)
}

/// Compile the flag sequence for one build.
///
/// Pure apart from the optional compiler probe, which only reads a directory.
pub fn compile(
  options: &OptionSet,
  platform: &PlatformFacts,
  deps: &DependencySet,
  locator: &dyn PackageLocator,
  install_prefix: &Path,
  settings: &CompileSettings,
) -> CompiledFlags {
  let mut flags = FlagList::new();

  flags.push(keys::INSTALL_PREFIX, install_prefix.to_string_lossy());

  for feature in TOGGLE_ORDER {
    let Some(key) = toggle_key(feature) else {
      continue;
    };
    if options.enabled(feature) {
      flags.push(key, TRUE);
    } else if explicit_when_declined(feature) && options.explicitly_without(feature) {
      flags.push(key, FALSE);
    }
  }

  let blas = format!(
    "{}/libopenblas.{}{}",
    locator.lib_dir(ids::OPENBLAS).display(),
    platform.shared_lib_extension,
    THREAD_LINK_SUFFIX
  );
  flags.push(keys::BLAS_LIBRARIES, blas.clone());
  flags.push(keys::LAPACK_LIBRARIES, blas);

  let toolchain = if options.enabled(Feature::DiscoverCompilers) {
    discover_compilers(&locator.bin_dir(ids::GCC))
  } else {
    None
  };

  if options.enabled(Feature::ElmerGui) {
    flags.push(keys::WITH_ELMERGUI, TRUE);
    flags.push(keys::WITH_QWT, TRUE);
    flags.push(keys::WITH_OCC, TRUE);
    flags.push(keys::WITH_VTK, TRUE);
    let qwt_headers = match platform.os {
      Os::MacOs => locator.lib_dir(ids::QWT).join("qwt.framework").join("Headers"),
      Os::Linux => locator.include_dir(ids::QWT),
    };
    flags.push(keys::QWT_INCLUDE_DIR, qwt_headers.to_string_lossy());
    if deps.contains(ids::QT5) {
      flags.push(keys::WITH_QT5, TRUE);
    }
  }

  flags.push(keys::BUILD_TYPE, settings.build_type.as_str());
  flags.push(keys::VERBOSE_MAKEFILE, "ON");
  if platform.os == Os::MacOs {
    flags.push(keys::FIND_FRAMEWORK, "LAST");
  }

  debug!(count = flags.len(), toolchain = toolchain.is_some(), "compiled flags");
  CompiledFlags { flags, toolchain }
}
