//! Properties that must hold for every option set.

use fembuild_lib::deps::{DEPENDENCIES, PrefixLocator, Requirement, resolve};
use fembuild_lib::flags::{CompileSettings, compile, keys};
use fembuild_lib::options::{Feature, OptionSet};
use fembuild_lib::plan::BuildPlan;
use fembuild_lib::platform::{Arch, Os, PlatformFacts};

fn linux() -> PlatformFacts {
  PlatformFacts::new(Os::Linux, Arch::X86_64)
}

fn mac() -> PlatformFacts {
  PlatformFacts::new(Os::MacOs, Arch::Aarch64)
}

/// Every combination of explicit choices over a few interesting features.
fn option_sets() -> Vec<OptionSet> {
  let features = [Feature::ElmerGui, Feature::Qt5, Feature::Mpi, Feature::Testing, Feature::Hypre];
  let mut sets = vec![OptionSet::new()];
  for feature in features {
    let mut next = Vec::new();
    for set in &sets {
      next.push(set.clone());
      next.push(set.clone().with(feature));
      next.push(set.clone().without(feature));
    }
    sets = next;
  }
  sets
}

fn plan(options: OptionSet, platform: PlatformFacts) -> BuildPlan {
  BuildPlan::new(
    options,
    platform,
    &PrefixLocator::new("/pkgs"),
    "/opt/elmer",
    &CompileSettings::default(),
  )
}

#[test]
fn optional_dependencies_absent_unless_requested() {
  for options in option_sets() {
    let deps = resolve(&options, &linux());
    for dep in DEPENDENCIES.iter().filter(|d| d.requirement == Requirement::Optional) {
      let toggle = dep.toggle.unwrap();
      if !options.explicitly_with(toggle) {
        assert!(!deps.contains(dep.id), "{} active without {}", dep.id, toggle);
      }
    }
  }
}

#[test]
fn recommended_dependencies_present_unless_declined() {
  for options in option_sets() {
    let deps = resolve(&options, &linux());
    for dep in DEPENDENCIES.iter().filter(|d| d.requirement == Requirement::Recommended) {
      let toggle = dep.toggle.unwrap();
      assert_eq!(deps.contains(dep.id), !options.explicitly_without(toggle), "{}", dep.id);
    }
  }
}

#[test]
fn required_and_build_only_always_present() {
  for options in option_sets() {
    let deps = resolve(&options, &mac());
    for id in ["cmake", "gcc", "openblas", "scalapack"] {
      assert!(deps.contains(id));
    }
  }
}

#[test]
fn at_most_one_gui_toolkit() {
  for options in option_sets() {
    let deps = resolve(&options, &linux());
    assert!(!(deps.contains("qt") && deps.contains("qt5")));
  }
}

#[test]
fn exactly_one_install_prefix() {
  for options in option_sets() {
    for platform in [linux(), mac()] {
      let plan = plan(options.clone(), platform);
      assert_eq!(plan.flags.count(keys::INSTALL_PREFIX), 1);
      assert_eq!(plan.flags.iter().next().unwrap().key, keys::INSTALL_PREFIX);
    }
  }
}

#[test]
fn no_gui_keys_without_gui() {
  for options in option_sets().into_iter().filter(|o| !o.enabled(Feature::ElmerGui)) {
    let plan = plan(options, mac());
    for key in keys::GUI {
      assert!(!plan.flags.contains_key(key), "{key} emitted without GUI");
    }
  }
}

#[test]
fn gui_keys_follow_toggles_and_precede_build_type() {
  let plan = plan(OptionSet::new().with(Feature::ElmerGui).with(Feature::Qt5), mac());
  let flags = &plan.flags;

  let mpi = flags.position(keys::WITH_MPI).unwrap();
  let gui = flags.position(keys::WITH_ELMERGUI).unwrap();
  let qt5 = flags.position(keys::WITH_QT5).unwrap();
  let build_type = flags.position(keys::BUILD_TYPE).unwrap();
  assert!(mpi < gui && gui < qt5 && qt5 < build_type);
  assert_eq!(
    flags.last(keys::QWT_INCLUDE_DIR),
    Some("/pkgs/opt/qwt/lib/qwt.framework/Headers")
  );
  assert_eq!(flags.last(keys::FIND_FRAMEWORK), Some("LAST"));
}

#[test]
fn resolution_and_compilation_are_deterministic() {
  let locator = PrefixLocator::new("/pkgs");
  let prefix = std::path::Path::new("/opt/elmer");
  for options in option_sets() {
    let platform = linux();
    let a = resolve(&options, &platform);
    let b = resolve(&options, &platform);
    assert_eq!(a, b);

    let settings = CompileSettings::default();
    let fa = compile(&options, &platform, &a, &locator, prefix, &settings);
    let fb = compile(&options, &platform, &b, &locator, prefix, &settings);
    assert_eq!(fa, fb);
  }
}
