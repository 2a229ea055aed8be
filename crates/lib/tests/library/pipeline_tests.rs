//! Running a plan through real processes with fake build tools.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use fembuild_lib::deps::PrefixLocator;
use fembuild_lib::execute::ProcessRunner;
use fembuild_lib::flags::CompileSettings;
use fembuild_lib::options::{Feature, OptionSet};
use fembuild_lib::orchestrate::{BuildDirs, BuildError, BuildStage, Orchestrator, Tools, VerifyOutcome};
use fembuild_lib::plan::BuildPlan;
use fembuild_lib::platform::{Arch, Os, PlatformFacts};
use fembuild_lib::smoke::{SmokeError, SmokeSuite, run_smoke_test};
use tempfile::TempDir;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
  std::fs::create_dir_all(dir).unwrap();
  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Tools that append `<name> <args>` to `log` in the current directory, then run `extra`.
fn tools(dir: &Path, cmake: &str, make: &str, ctest: &str) -> Tools {
  let path = |name: &str, extra: &str| {
    script(dir, name, &format!("echo \"{name} $*\" >> ../stages.log\n{extra}"))
      .to_string_lossy()
      .into_owned()
  };
  Tools {
    cmake: path("cmake", cmake),
    make: path("make", make),
    ctest: path("ctest", ctest),
  }
}

fn plan(options: OptionSet) -> BuildPlan {
  BuildPlan::new(
    options,
    PlatformFacts::new(Os::Linux, Arch::X86_64),
    &PrefixLocator::new("/pkgs"),
    "/opt/elmer",
    &CompileSettings::default(),
  )
}

fn stages_log(dirs: &BuildDirs) -> Vec<String> {
  std::fs::read_to_string(dirs.source.join("stages.log"))
    .unwrap_or_default()
    .lines()
    .map(|l| l.split_whitespace().take(2).collect::<Vec<_>>().join(" "))
    .collect()
}

#[tokio::test]
async fn full_pipeline_with_verify() {
  let temp = TempDir::new().unwrap();
  let dirs = BuildDirs::in_source(temp.path().join("elmerfem"));
  let runner = ProcessRunner::default();
  let orchestrator = Orchestrator::new(&runner, tools(&temp.path().join("bin"), "", "", ""));

  let report = orchestrator
    .run(&plan(OptionSet::new().with(Feature::Testing)), &dirs)
    .await
    .unwrap();

  assert!(report.is_success());
  let stages: Vec<_> = report.stages.iter().map(|r| r.stage).collect();
  assert_eq!(stages, BuildStage::ALL);
  let log = stages_log(&dirs);
  assert_eq!(log.len(), 4);
  assert!(log[0].starts_with("cmake "));
  assert_eq!(log[3], "ctest -L");
}

#[tokio::test]
async fn configure_exit_code_is_reported() {
  let temp = TempDir::new().unwrap();
  let dirs = BuildDirs::in_source(temp.path().join("elmerfem"));
  let runner = ProcessRunner::default();
  let orchestrator = Orchestrator::new(&runner, tools(&temp.path().join("bin"), "exit 1", "", ""));

  let err = orchestrator.run(&plan(OptionSet::new()), &dirs).await.unwrap_err();

  assert!(matches!(
    err,
    BuildError::StageFailed {
      stage: BuildStage::Configure,
      code: Some(1)
    }
  ));
  assert_eq!(stages_log(&dirs).len(), 1);
}

#[tokio::test]
async fn verify_failure_leaves_install_in_place() {
  let temp = TempDir::new().unwrap();
  let dirs = BuildDirs::in_source(temp.path().join("elmerfem"));
  let runner = ProcessRunner::default();
  let make = "[ \"$1\" = install ] && touch ../installed; exit 0";
  let orchestrator = Orchestrator::new(&runner, tools(&temp.path().join("bin"), "", make, "exit 8"));

  let report = orchestrator
    .run(&plan(OptionSet::new().with(Feature::Testing)), &dirs)
    .await
    .unwrap();

  assert_eq!(report.verify, VerifyOutcome::Failed { code: Some(8) });
  assert!(dirs.source.join("installed").exists());
}

#[tokio::test]
async fn shipped_suite_against_fake_install() {
  let temp = TempDir::new().unwrap();
  let bin = temp.path().join("bin");
  script(&bin, "ElmerGrid", "test -f geomstiff.grd");
  script(&bin, "ElmerSolver", "test -f test.sif && printf '1\\n' > TEST.PASSED");
  let suite = SmokeSuite::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/elmer")).unwrap();

  let report = run_smoke_test(&suite, &bin, None, &ProcessRunner::default()).await.unwrap();

  assert_eq!(report.steps.len(), 2);
}

#[tokio::test]
async fn shipped_suite_detects_missing_marker() {
  let temp = TempDir::new().unwrap();
  let bin = temp.path().join("bin");
  script(&bin, "ElmerGrid", "exit 0");
  script(&bin, "ElmerSolver", "exit 0");
  let suite = SmokeSuite::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/elmer")).unwrap();

  let err = run_smoke_test(&suite, &bin, None, &ProcessRunner::default()).await.unwrap_err();

  assert!(matches!(err, SmokeError::MarkerMissing { .. }));
}
