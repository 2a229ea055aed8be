//! External package dependencies of the solver build.
//!
//! The declaration list is static and ordered. Order matters: flags that
//! reference a dependency's location are emitted in declaration order, and the
//! resolved set preserves it.

pub mod locator;
pub mod resolve;

use std::fmt;

use serde::Serialize;

use crate::options::{Feature, OptionSet};
use crate::platform::PlatformFacts;

pub use locator::{PackageLocator, PrefixLocator};
pub use resolve::{DependencySet, DroppedDependency, ResolvedDependency, resolve};

/// How strongly the build needs a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Requirement {
  /// Always selected.
  Required,
  /// Selected unless its toggle is explicitly declined.
  Recommended,
  /// Selected only when its toggle is explicitly requested.
  Optional,
  /// Always selected; only needed while building.
  BuildOnly,
}

impl Requirement {
  pub fn as_str(&self) -> &'static str {
    match self {
      Requirement::Required => "required",
      Requirement::Recommended => "recommended",
      Requirement::Optional => "optional",
      Requirement::BuildOnly => "build-only",
    }
  }
}

impl fmt::Display for Requirement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Mutually exclusive groups of dependencies. At most one member may be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
  GuiToolkit,
}

impl fmt::Display for Family {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Family::GuiToolkit => f.write_str("gui-toolkit"),
    }
  }
}

/// Extra gate evaluated after the requirement policy.
pub type Selector = fn(&OptionSet, &PlatformFacts) -> bool;

/// A declared external package.
#[derive(Debug, Clone, Copy)]
pub struct Dependency {
  pub id: &'static str,
  pub requirement: Requirement,
  /// Option controlling recommended/optional dependencies.
  pub toggle: Option<Feature>,
  /// Build variant requested from the provider (e.g. `f90` for open-mpi).
  pub variant: Option<&'static str>,
  pub family: Option<Family>,
  /// Higher wins when family members conflict.
  pub specificity: u8,
  pub selector: Selector,
}

impl Dependency {
  /// Whether this dependency is active for the given inputs.
  pub fn is_selected(&self, options: &OptionSet, platform: &PlatformFacts) -> bool {
    let by_policy = match (self.requirement, self.toggle) {
      (Requirement::Required | Requirement::BuildOnly, _) => true,
      (Requirement::Recommended, Some(toggle)) => !options.explicitly_without(toggle),
      (Requirement::Optional, Some(toggle)) => options.explicitly_with(toggle),
      (Requirement::Recommended, None) => true,
      (Requirement::Optional, None) => false,
    };
    by_policy && (self.selector)(options, platform)
  }
}

fn always(_: &OptionSet, _: &PlatformFacts) -> bool {
  true
}

fn gui_requested(options: &OptionSet, _: &PlatformFacts) -> bool {
  options.enabled(Feature::ElmerGui)
}

const fn declare(id: &'static str, requirement: Requirement, toggle: Option<Feature>) -> Dependency {
  Dependency {
    id,
    requirement,
    toggle,
    variant: None,
    family: None,
    specificity: 0,
    selector: always,
  }
}

/// Every package the build may need, in declaration order.
pub static DEPENDENCIES: &[Dependency] = &[
  Dependency {
    variant: Some("f90"),
    ..declare("open-mpi", Requirement::Recommended, Some(Feature::Mpi))
  },
  declare("cmake", Requirement::BuildOnly, None),
  declare("gcc", Requirement::BuildOnly, None),
  declare("openblas", Requirement::Required, None),
  declare("scalapack", Requirement::Required, None),
  declare("hypre", Requirement::Recommended, Some(Feature::Hypre)),
  declare("mumps", Requirement::Recommended, Some(Feature::Mumps)),
  Dependency {
    family: Some(Family::GuiToolkit),
    ..declare("qt", Requirement::Optional, Some(Feature::ElmerGui))
  },
  Dependency {
    family: Some(Family::GuiToolkit),
    specificity: 1,
    selector: gui_requested,
    ..declare("qt5", Requirement::Optional, Some(Feature::Qt5))
  },
  declare("qwt", Requirement::Optional, Some(Feature::ElmerGui)),
];

/// Well-known dependency ids referenced by the flag compiler.
pub mod ids {
  pub const OPENBLAS: &str = "openblas";
  pub const GCC: &str = "gcc";
  pub const QT5: &str = "qt5";
  pub const QWT: &str = "qwt";
}
