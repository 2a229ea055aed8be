//! Dependency resolution.
//!
//! `resolve` walks the declaration list in order and keeps every dependency
//! whose requirement policy and selector accept the option set. Family
//! conflicts are settled afterwards: the most specific member stays, the rest
//! are dropped and reported.

use serde::Serialize;
use tracing::{debug, warn};

use super::{DEPENDENCIES, Dependency, Family, Requirement};
use crate::options::OptionSet;
use crate::platform::PlatformFacts;

/// An active dependency in the resolved set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
  pub id: &'static str,
  pub requirement: Requirement,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub variant: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub family: Option<Family>,
  #[serde(skip)]
  specificity: u8,
}

impl From<&Dependency> for ResolvedDependency {
  fn from(dep: &Dependency) -> Self {
    Self {
      id: dep.id,
      requirement: dep.requirement,
      variant: dep.variant,
      family: dep.family,
      specificity: dep.specificity,
    }
  }
}

/// A family member removed because a more specific one was also selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedDependency {
  pub id: &'static str,
  pub family: Family,
  pub kept: &'static str,
}

/// Ordered, deduplicated set of active dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencySet {
  active: Vec<ResolvedDependency>,
  dropped: Vec<DroppedDependency>,
}

impl DependencySet {
  /// Append a dependency unless one with the same id is already present.
  fn push(&mut self, dep: ResolvedDependency) -> bool {
    if self.contains(dep.id) {
      return false;
    }
    self.active.push(dep);
    true
  }

  /// Keep one member per family: highest specificity, earliest declaration on ties.
  fn settle_conflicts(&mut self) {
    let families: Vec<Family> = {
      let mut seen = Vec::new();
      for family in self.active.iter().filter_map(|d| d.family) {
        if !seen.contains(&family) {
          seen.push(family);
        }
      }
      seen
    };

    for family in families {
      let Some(kept) = self
        .active
        .iter()
        .filter(|d| d.family == Some(family))
        .reduce(|best, d| if d.specificity > best.specificity { d } else { best })
        .map(|d| d.id)
      else {
        continue;
      };

      let mut dropped = Vec::new();
      self.active.retain(|d| {
        if d.family == Some(family) && d.id != kept {
          dropped.push(d.id);
          false
        } else {
          true
        }
      });

      for id in dropped {
        warn!(dropped = id, kept, family = %family, "conflicting dependencies selected, keeping the more specific one");
        self.dropped.push(DroppedDependency { id, family, kept });
      }
    }
  }

  pub fn contains(&self, id: &str) -> bool {
    self.active.iter().any(|d| d.id == id)
  }

  pub fn get(&self, id: &str) -> Option<&ResolvedDependency> {
    self.active.iter().find(|d| d.id == id)
  }

  pub fn iter(&self) -> impl Iterator<Item = &ResolvedDependency> {
    self.active.iter()
  }

  pub fn ids(&self) -> Vec<&'static str> {
    self.active.iter().map(|d| d.id).collect()
  }

  pub fn dropped(&self) -> &[DroppedDependency] {
    &self.dropped
  }

  pub fn len(&self) -> usize {
    self.active.len()
  }

  pub fn is_empty(&self) -> bool {
    self.active.is_empty()
  }
}

/// Compute the dependencies required by an option set on a platform.
///
/// Never fails: missing tooling is detected when Configure runs.
pub fn resolve(options: &OptionSet, platform: &PlatformFacts) -> DependencySet {
  resolve_from(DEPENDENCIES, options, platform)
}

/// Resolve against an explicit declaration list.
pub fn resolve_from(declarations: &[Dependency], options: &OptionSet, platform: &PlatformFacts) -> DependencySet {
  let mut set = DependencySet::default();

  for dep in declarations {
    if dep.is_selected(options, platform) {
      if !set.push(dep.into()) {
        debug!(id = dep.id, "duplicate dependency declaration ignored");
      }
    } else {
      debug!(id = dep.id, requirement = %dep.requirement, "dependency not selected");
    }
  }

  set.settle_conflicts();
  debug!(platform = %platform, deps = ?set.ids(), "resolved dependencies");
  set
}
