//! Build plans.
//!
//! A [`BuildPlan`] is everything derived from one invocation's inputs before any
//! process runs: the resolved dependencies, the compiled flags, the optional
//! toolchain override and whether Verify will run. It is recomputed on every
//! invocation and never persisted.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::deps::{DependencySet, PackageLocator, resolve};
use crate::flags::{CompileSettings, FlagList, ToolchainOverride, compile};
use crate::options::{Feature, OptionSet};
use crate::platform::PlatformFacts;
use crate::util::hash::Hashable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
  pub options: OptionSet,
  pub platform: PlatformFacts,
  pub install_prefix: PathBuf,
  pub dependencies: DependencySet,
  pub flags: FlagList,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub toolchain: Option<ToolchainOverride>,
  /// Whether the quick test suite runs after Install.
  pub verify: bool,
}

impl Hashable for BuildPlan {}

impl BuildPlan {
  /// Resolve dependencies and compile flags for one build.
  pub fn new(
    options: OptionSet,
    platform: PlatformFacts,
    locator: &dyn PackageLocator,
    install_prefix: impl AsRef<Path>,
    settings: &CompileSettings,
  ) -> Self {
    let install_prefix = install_prefix.as_ref().to_path_buf();
    let dependencies = resolve(&options, &platform);
    let compiled = compile(&options, &platform, &dependencies, locator, &install_prefix, settings);
    let verify = options.enabled(Feature::Testing);

    Self {
      options,
      platform,
      install_prefix,
      dependencies,
      flags: compiled.flags,
      toolchain: compiled.toolchain,
      verify,
    }
  }

  /// Dependency ids to hand to an external provisioner, in declaration order.
  pub fn package_ids(&self) -> Vec<&'static str> {
    self.dependencies.ids()
  }
}
