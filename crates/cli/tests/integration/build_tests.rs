use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_runs_stages_in_order() {
  let env = TestEnv::new();
  env.fake_tools("", "", "");

  env
    .build_cmd("")
    .assert()
    .success()
    .stdout(predicate::str::contains("Installed to"));

  let log = env.log();
  assert_eq!(log.len(), 3);
  assert!(log[0].starts_with(&format!("cmake {} -DCMAKE_INSTALL_PREFIX=", env.source_dir().canonicalize().unwrap().display())));
  assert_eq!(log[1], "make ");
  assert_eq!(log[2], "make install");
  assert!(env.source_dir().join("build").is_dir());
}

#[test]
fn build_runs_tools_in_build_dir() {
  let env = TestEnv::new();
  env.fake_tools("pwd > cmake.cwd", "", "");

  env.build_cmd("").assert().success();

  let cwd = std::fs::read_to_string(env.source_dir().join("build").join("cmake.cwd")).unwrap();
  assert!(cwd.trim_end().ends_with("elmerfem/build"));
}

#[test]
fn testing_runs_quick_suite() {
  let env = TestEnv::new();
  env.fake_tools("", "", "");

  env.build_cmd("").arg("--with").arg("testing").assert().success();

  assert_eq!(env.log().last().map(String::as_str), Some("ctest -L quick"));
}

#[test]
fn configure_failure_exits_two_without_compiling() {
  let env = TestEnv::new();
  env.fake_tools("exit 1", "", "");

  env
    .build_cmd("")
    .assert()
    .code(2)
    .stderr(predicate::str::contains("configure failed"));

  assert_eq!(env.log().len(), 1);
}

#[test]
fn compile_failure_exits_three() {
  let env = TestEnv::new();
  env.fake_tools("", "[ \"$1\" = install ] || exit 2", "");

  env.build_cmd("").assert().code(3);

  assert!(!env.log().iter().any(|l| l == "make install"));
}

#[test]
fn install_failure_exits_four() {
  let env = TestEnv::new();
  env.fake_tools("", "[ \"$1\" = install ] && exit 2; exit 0", "");

  env.build_cmd("").arg("--with").arg("testing").assert().code(4);

  assert!(!env.log().iter().any(|l| l.starts_with("ctest")));
}

#[test]
fn verify_failure_exits_five_and_keeps_install() {
  let env = TestEnv::new();
  env.fake_tools("", "[ \"$1\" = install ] && touch \"$FEMBUILD_TEST_LOG.installed\"; exit 0", "exit 8");

  env
    .build_cmd("")
    .arg("--with")
    .arg("testing")
    .assert()
    .code(5)
    .stderr(predicate::str::contains("Quick tests failed"));

  let marker = format!("{}.installed", env.log_path().display());
  assert!(std::path::Path::new(&marker).exists());
}

#[test]
fn missing_test_driver_exits_five_and_keeps_install() {
  let env = TestEnv::new();
  env.fake_tools("", "", "");
  std::fs::remove_file(env.tools_dir().join("ctest")).unwrap();

  env
    .build_cmd("")
    .arg("--with")
    .arg("testing")
    .assert()
    .code(5)
    .stderr(predicate::str::contains("Quick tests could not be started"));

  assert_eq!(env.log().last().map(String::as_str), Some("make install"));
}

#[test]
fn missing_tool_fails_configure() {
  let env = TestEnv::new();
  let config = env.write_config("");
  std::fs::remove_dir_all(env.tools_dir()).unwrap();

  env
    .fembuild_cmd()
    .arg("--config")
    .arg(config)
    .arg("build")
    .arg("--source")
    .arg(env.source_dir())
    .arg("--prefix")
    .arg(env.prefix())
    .assert()
    .code(2)
    .stderr(predicate::str::contains("could not start"));
}

#[test]
fn dry_run_spawns_nothing() {
  let env = TestEnv::new();
  env.fake_tools("", "", "");

  env
    .build_cmd("")
    .arg("--dry-run")
    .assert()
    .success()
    .stdout(predicate::str::contains("Dry run"))
    .stdout(predicate::str::contains("make install"));

  assert!(env.log().is_empty());
}

#[test]
fn provisioner_runs_before_configure() {
  let env = TestEnv::new();
  env.fake_tools("", "", "");
  let provision = super::common::write_script(&env.tools_dir(), "provision", "echo \"provision $*\" >> \"$FEMBUILD_TEST_LOG\"");

  env
    .build_cmd(&format!("provision = [\"{}\"]", provision.display()))
    .arg("--without")
    .arg("mpi")
    .assert()
    .success();

  let log = env.log();
  assert_eq!(log[0], "provision cmake gcc openblas scalapack hypre mumps");
  assert!(log[1].starts_with("cmake "));
}

#[test]
fn provisioner_failure_exits_seven() {
  let env = TestEnv::new();
  env.fake_tools("", "", "");

  env
    .build_cmd("provision = [\"/bin/sh\", \"-c\", \"exit 3\"]")
    .assert()
    .code(7);

  assert!(env.log().is_empty());
}

#[test]
fn build_json_report() {
  let env = TestEnv::new();
  env.fake_tools("", "", "");

  let output = env.build_cmd("").args(["-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
  assert_eq!(report["stages"].as_array().unwrap().len(), 3);
  assert_eq!(report["verify"]["result"], "skipped");
}
