use predicates::prelude::*;

use super::common::{TestEnv, elmer_suite, write_script};

/// Fake Elmer installation whose solver writes `marker` into TEST.PASSED.
fn fake_install(env: &TestEnv, marker: &str) -> std::path::PathBuf {
  let bin = env.prefix().join("bin");
  write_script(&bin, "ElmerGrid", "test -f geomstiff.grd || exit 1\nmkdir -p geomstiff");
  write_script(
    &bin,
    "ElmerSolver",
    &format!("test -f test.sif && test -d geomstiff || exit 1\nprintf '{marker}' > TEST.PASSED"),
  );
  bin
}

#[test]
fn elmer_suite_passes() {
  let env = TestEnv::new();
  fake_install(&env, "1\\n");

  env
    .fembuild_cmd()
    .arg("smoke")
    .arg("--prefix")
    .arg(env.prefix())
    .arg("--suite")
    .arg(elmer_suite())
    .assert()
    .success()
    .stdout(predicate::str::contains("passed"));
}

#[test]
fn wrong_marker_exits_six() {
  let env = TestEnv::new();
  let bin = fake_install(&env, "0\\n");

  env
    .fembuild_cmd()
    .arg("smoke")
    .arg("--bin-dir")
    .arg(bin)
    .arg("--suite")
    .arg(elmer_suite())
    .assert()
    .code(6)
    .stderr(predicate::str::contains("result marker"));
}

#[test]
fn failing_step_exits_six() {
  let env = TestEnv::new();
  let bin = env.prefix().join("bin");
  write_script(&bin, "ElmerGrid", "exit 1");
  write_script(&bin, "ElmerSolver", "exit 0");

  env
    .fembuild_cmd()
    .arg("smoke")
    .arg("--bin-dir")
    .arg(bin)
    .arg("--suite")
    .arg(elmer_suite())
    .assert()
    .code(6)
    .stderr(predicate::str::contains("ElmerGrid exited"));
}

#[test]
fn keep_leaves_scratch_in_cache() {
  let env = TestEnv::new();
  fake_install(&env, "1\\n");

  env
    .fembuild_cmd()
    .arg("smoke")
    .arg("--prefix")
    .arg(env.prefix())
    .arg("--suite")
    .arg(elmer_suite().join("suite.toml"))
    .arg("--keep")
    .assert()
    .success();

  let smoke_dir = env.cache_path().join("fembuild").join("smoke");
  let scratch = std::fs::read_dir(&smoke_dir).unwrap().next().unwrap().unwrap().path();
  assert_eq!(std::fs::read_to_string(scratch.join("TEST.PASSED")).unwrap(), "1\n");
  assert!(scratch.join("test.sif").is_file());
}

#[test]
fn repeated_keep_runs_get_their_own_scratch() {
  let env = TestEnv::new();
  fake_install(&env, "1\\n");

  for _ in 0..2 {
    env
      .fembuild_cmd()
      .arg("smoke")
      .arg("--prefix")
      .arg(env.prefix())
      .arg("--suite")
      .arg(elmer_suite())
      .arg("--keep")
      .assert()
      .success();
  }

  let smoke_dir = env.cache_path().join("fembuild").join("smoke");
  let kept: Vec<_> = std::fs::read_dir(&smoke_dir).unwrap().collect();
  assert_eq!(kept.len(), 2);
}

#[test]
fn suite_from_config() {
  let env = TestEnv::new();
  fake_install(&env, "1\\n");
  let config = env.temp.path().join("smoke.toml");
  std::fs::write(&config, format!("[smoke]\nsuite = \"{}\"\n", elmer_suite().display())).unwrap();

  env
    .fembuild_cmd()
    .arg("--config")
    .arg(config)
    .arg("smoke")
    .arg("--prefix")
    .arg(env.prefix())
    .assert()
    .success();
}

#[test]
fn missing_suite_exits_one() {
  let env = TestEnv::new();
  fake_install(&env, "1\\n");

  env
    .fembuild_cmd()
    .arg("smoke")
    .arg("--prefix")
    .arg(env.prefix())
    .assert()
    .code(1)
    .stderr(predicate::str::contains("no smoke suite"));
}
