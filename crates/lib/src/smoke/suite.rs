//! Smoke-test suite manifests.
//!
//! A suite is a `suite.toml` next to its fixture files:
//!
//! ```toml
//! fixtures = ["test.sif", "geomstiff.grd"]
//!
//! [[steps]]
//! program = "ElmerGrid"
//! args = ["1", "2", "geomstiff.grd"]
//!
//! [marker]
//! path = "TEST.PASSED"
//! expected = "1\n"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::SmokeError;

/// Name of the manifest file inside a suite directory.
pub const SUITE_FILENAME: &str = "suite.toml";

/// On-disk manifest form.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteManifest {
  #[serde(default)]
  name: Option<String>,
  #[serde(default)]
  fixtures: Vec<PathBuf>,
  #[serde(default)]
  steps: Vec<SmokeStep>,
  #[serde(default)]
  marker: Option<MarkerCheck>,
}

/// An input file written into the scratch directory before any step runs.
///
/// Content is kept as raw bytes and written verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureFile {
  /// Path relative to the scratch directory.
  pub path: PathBuf,
  pub content: Vec<u8>,
}

impl FixtureFile {
  pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
    Self {
      path: path.into(),
      content: content.into(),
    }
  }
}

/// One program run. `program` is looked up in the installation's bin directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmokeStep {
  pub program: String,
  #[serde(default)]
  pub args: Vec<String>,
}

/// File the last step must leave behind, with its exact content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkerCheck {
  pub path: PathBuf,
  pub expected: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeSuite {
  pub name: String,
  pub fixtures: Vec<FixtureFile>,
  pub steps: Vec<SmokeStep>,
  pub marker: Option<MarkerCheck>,
}

impl SmokeSuite {
  /// Load a suite from a manifest file or a directory containing `suite.toml`.
  pub fn load(path: &Path) -> Result<Self, SmokeError> {
    let manifest_path = if path.is_dir() {
      path.join(SUITE_FILENAME)
    } else {
      path.to_path_buf()
    };
    let base = manifest_path.parent().unwrap_or(Path::new("."));

    let raw = fs::read_to_string(&manifest_path).map_err(|source| SmokeError::Io {
      path: manifest_path.clone(),
      source,
    })?;
    let manifest: SuiteManifest = toml::from_str(&raw).map_err(|e| SmokeError::Load {
      path: manifest_path.clone(),
      message: e.to_string(),
    })?;

    let mut fixtures = Vec::with_capacity(manifest.fixtures.len());
    for relative in manifest.fixtures {
      check_relative(&manifest_path, &relative)?;
      let source = base.join(&relative);
      let content = fs::read(&source).map_err(|source_err| SmokeError::Io {
        path: source.clone(),
        source: source_err,
      })?;
      fixtures.push(FixtureFile::new(relative, content));
    }

    if let Some(marker) = &manifest.marker {
      check_relative(&manifest_path, &marker.path)?;
    }

    let name = manifest.name.unwrap_or_else(|| {
      base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "smoke".to_string())
    });

    Ok(Self {
      name,
      fixtures,
      steps: manifest.steps,
      marker: manifest.marker,
    })
  }
}

/// Fixture and marker paths must stay inside the scratch directory.
fn check_relative(manifest: &Path, relative: &Path) -> Result<(), SmokeError> {
  let escapes = relative.is_absolute()
    || relative
      .components()
      .any(|c| matches!(c, std::path::Component::ParentDir));
  if escapes {
    return Err(SmokeError::Load {
      path: manifest.to_path_buf(),
      message: format!("path {} must be relative to the scratch directory", relative.display()),
    });
  }
  Ok(())
}
