//! Install locations of resolved dependencies.

use std::path::{Path, PathBuf};

/// Maps a dependency id to where its provider installed it.
///
/// Locations are not checked for existence; a wrong path shows up when the
/// payload's Configure step fails.
pub trait PackageLocator {
  /// Installation prefix of the package.
  fn prefix(&self, id: &str) -> PathBuf;

  fn lib_dir(&self, id: &str) -> PathBuf {
    self.prefix(id).join("lib")
  }

  fn bin_dir(&self, id: &str) -> PathBuf {
    self.prefix(id).join("bin")
  }

  fn include_dir(&self, id: &str) -> PathBuf {
    self.prefix(id).join("include")
  }
}

/// Locates packages under `<root>/opt/<id>`, the layout of Homebrew-style providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixLocator {
  root: PathBuf,
}

impl PrefixLocator {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl PackageLocator for PrefixLocator {
  fn prefix(&self, id: &str) -> PathBuf {
    self.root.join("opt").join(id)
  }
}
