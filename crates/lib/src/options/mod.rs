//! Build options.
//!
//! Every user-selectable toggle is a variant of the closed [`Feature`] enum, so the
//! resolver and the flag compiler match on them exhaustively. An [`OptionSet`] only
//! records what the caller chose explicitly; the effective value falls back to the
//! declared default of each option.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
  #[error("unknown option: {0}")]
  Unknown(String),

  #[error("malformed option token '{0}': expected with-<name> or without-<name>")]
  Malformed(String),

  #[error("option {feature} is both enabled and disabled")]
  Contradiction { feature: Feature },
}

/// A user-selectable build toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feature {
  #[serde(rename = "elmerice")]
  ElmerIce,
  #[serde(rename = "elmergui")]
  ElmerGui,
  #[serde(rename = "openmp")]
  OpenMp,
  #[serde(rename = "testing")]
  Testing,
  #[serde(rename = "mpi")]
  Mpi,
  #[serde(rename = "hypre")]
  Hypre,
  #[serde(rename = "mumps")]
  Mumps,
  #[serde(rename = "qt5")]
  Qt5,
  #[serde(rename = "discover-compilers")]
  DiscoverCompilers,
}

/// Whether an option is on unless declined, or off unless requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultState {
  Recommended,
  Optional,
}

/// Static declaration of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDecl {
  pub feature: Feature,
  pub default: DefaultState,
  pub description: &'static str,
}

impl Feature {
  pub const ALL: [Feature; 9] = [
    Feature::ElmerIce,
    Feature::ElmerGui,
    Feature::OpenMp,
    Feature::Testing,
    Feature::Mpi,
    Feature::Hypre,
    Feature::Mumps,
    Feature::Qt5,
    Feature::DiscoverCompilers,
  ];

  /// The name used on the command line and in config files.
  pub fn name(&self) -> &'static str {
    match self {
      Feature::ElmerIce => "elmerice",
      Feature::ElmerGui => "elmergui",
      Feature::OpenMp => "openmp",
      Feature::Testing => "testing",
      Feature::Mpi => "mpi",
      Feature::Hypre => "hypre",
      Feature::Mumps => "mumps",
      Feature::Qt5 => "qt5",
      Feature::DiscoverCompilers => "discover-compilers",
    }
  }

  pub fn decl(&self) -> OptionDecl {
    let (default, description) = match self {
      Feature::ElmerIce => (DefaultState::Optional, "Build ElmerIce"),
      Feature::ElmerGui => (DefaultState::Optional, "Build ElmerGUI"),
      Feature::OpenMp => (DefaultState::Optional, "Enable OpenMP support (experimental)"),
      Feature::Testing => (DefaultState::Optional, "Run the quick tests"),
      Feature::Mpi => (DefaultState::Recommended, "Build with MPI support (open-mpi)"),
      Feature::Hypre => (DefaultState::Recommended, "Build with the Hypre solver library"),
      Feature::Mumps => (DefaultState::Recommended, "Build with the MUMPS direct solver"),
      Feature::Qt5 => (DefaultState::Optional, "Build ElmerGUI against Qt5"),
      Feature::DiscoverCompilers => (
        DefaultState::Optional,
        "Use the first versioned gcc/g++ pair, in lexical order, found in the gcc package",
      ),
    };
    OptionDecl {
      feature: *self,
      default,
      description,
    }
  }
}

impl fmt::Display for Feature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Feature {
  type Err = OptionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Feature::ALL
      .into_iter()
      .find(|f| f.name() == s)
      .ok_or_else(|| OptionError::Unknown(s.to_string()))
  }
}

/// What the caller said about an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
  With,
  Without,
  #[default]
  Unset,
}

/// The caller's explicit choices for one build invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
  choices: BTreeMap<Feature, Choice>,
}

impl OptionSet {
  /// An option set where every option takes its declared default.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, feature: Feature) -> Self {
    self.set(feature, Choice::With);
    self
  }

  pub fn without(mut self, feature: Feature) -> Self {
    self.set(feature, Choice::Without);
    self
  }

  /// Record a choice; a later call for the same feature replaces the earlier one.
  pub fn set(&mut self, feature: Feature, choice: Choice) {
    match choice {
      Choice::Unset => {
        self.choices.remove(&feature);
      }
      choice => {
        self.choices.insert(feature, choice);
      }
    }
  }

  pub fn choice(&self, feature: Feature) -> Choice {
    self.choices.get(&feature).copied().unwrap_or_default()
  }

  /// Effective value: the explicit choice, else the declared default.
  pub fn enabled(&self, feature: Feature) -> bool {
    match self.choice(feature) {
      Choice::With => true,
      Choice::Without => false,
      Choice::Unset => feature.decl().default == DefaultState::Recommended,
    }
  }

  pub fn explicitly_with(&self, feature: Feature) -> bool {
    self.choice(feature) == Choice::With
  }

  pub fn explicitly_without(&self, feature: Feature) -> bool {
    self.choice(feature) == Choice::Without
  }

  /// Apply explicit enable/disable lists, rejecting a feature named in both.
  pub fn apply_lists(&mut self, with: &[Feature], without: &[Feature]) -> Result<(), OptionError> {
    if let Some(feature) = with.iter().find(|f| without.contains(f)) {
      return Err(OptionError::Contradiction { feature: *feature });
    }
    for feature in with {
      self.set(*feature, Choice::With);
    }
    for feature in without {
      self.set(*feature, Choice::Without);
    }
    Ok(())
  }

  /// Parse a `with-<name>` / `without-<name>` token.
  pub fn parse_token(token: &str) -> Result<(Feature, Choice), OptionError> {
    let token = token.trim_start_matches("--");
    if let Some(name) = token.strip_prefix("without-") {
      Ok((name.parse()?, Choice::Without))
    } else if let Some(name) = token.strip_prefix("with-") {
      Ok((name.parse()?, Choice::With))
    } else {
      Err(OptionError::Malformed(token.to_string()))
    }
  }

  /// Explicit choices in a stable order.
  pub fn explicit(&self) -> impl Iterator<Item = (Feature, Choice)> + '_ {
    self.choices.iter().map(|(f, c)| (*f, *c))
  }
}
