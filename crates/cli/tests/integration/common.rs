//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// The Elmer smoke suite shipped with the repository.
pub fn elmer_suite() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("..")
    .join("..")
    .join("fixtures")
    .join("elmer")
}

/// Write an executable shell script.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  std::fs::create_dir_all(dir).unwrap();
  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding a fake source tree,
/// fake build tools that log their invocations, and isolated config and cache
/// directories.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };
    std::fs::create_dir_all(env.source_dir()).unwrap();
    std::fs::write(env.source_dir().join("CMakeLists.txt"), "project(elmerfem)\n").unwrap();
    env
  }

  fn dir(&self, name: &str) -> PathBuf {
    let p = self.temp.path().join(name);
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn source_dir(&self) -> PathBuf {
    self.temp.path().join("elmerfem")
  }

  pub fn prefix(&self) -> PathBuf {
    self.dir("prefix")
  }

  pub fn tools_dir(&self) -> PathBuf {
    self.dir("tools")
  }

  pub fn cache_path(&self) -> PathBuf {
    self.dir("cache")
  }

  /// File every fake tool appends its command line to.
  pub fn log_path(&self) -> PathBuf {
    self.temp.path().join("tools.log")
  }

  pub fn log(&self) -> Vec<String> {
    std::fs::read_to_string(self.log_path())
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  /// Install fake cmake/make/ctest. Each logs `<tool> <args>` and then runs `extra`.
  pub fn fake_tools(&self, cmake: &str, make: &str, ctest: &str) {
    let dir = self.tools_dir();
    for (name, extra) in [("cmake", cmake), ("make", make), ("ctest", ctest)] {
      write_script(
        &dir,
        name,
        &format!("echo \"{name} $*\" >> \"$FEMBUILD_TEST_LOG\"\n{extra}"),
      );
    }
  }

  /// Config file pointing the pipeline at the fake tools.
  pub fn write_config(&self, extra: &str) -> PathBuf {
    let tools = self.tools_dir();
    let path = self.temp.path().join("fembuild.toml");
    let body = format!(
      "packages_root = \"{root}\"\n{extra}\n\n[tools]\ncmake = \"{cmake}\"\nmake = \"{make}\"\nctest = \"{ctest}\"\n",
      root = self.temp.path().join("pkgs").display(),
      cmake = tools.join("cmake").display(),
      make = tools.join("make").display(),
      ctest = tools.join("ctest").display(),
    );
    std::fs::write(&path, body).unwrap();
    path
  }

  /// A fembuild command isolated from the user's environment.
  pub fn fembuild_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("fembuild");
    cmd.env("XDG_CONFIG_HOME", self.dir("config"));
    cmd.env("XDG_CACHE_HOME", self.cache_path());
    cmd.env("FEMBUILD_TEST_LOG", self.log_path());
    cmd.env_remove("FEMBUILD_PREFIX");
    cmd.env_remove("FEMBUILD_PACKAGES_ROOT");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// `fembuild build` with the fake tools, source tree and prefix wired in.
  pub fn build_cmd(&self, config_extra: &str) -> Command {
    let config = self.write_config(config_extra);
    let mut cmd = self.fembuild_cmd();
    cmd
      .arg("--config")
      .arg(config)
      .arg("build")
      .arg("--source")
      .arg(self.source_dir())
      .arg("--prefix")
      .arg(self.prefix());
    cmd
  }
}
