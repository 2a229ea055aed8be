use anyhow::{Context, Result};

use fembuild_lib::config::Config;
use fembuild_lib::platform::PlatformFacts;
use fembuild_lib::platform::paths::config_file;

use crate::output::{OutputFormat, print_json, print_list, print_stat};

pub fn cmd_info(config: &Config, output: OutputFormat) -> Result<()> {
  let platform = PlatformFacts::detect().context("Failed to detect platform")?;

  if output.is_json() {
    return print_json(&serde_json::json!({
      "platform": platform,
      "packages_root": config.packages_root(),
      "config_file": config_file(),
    }));
  }

  println!("System:");
  print_stat("Platform", &platform.triple());
  print_stat("Shared libraries", &format!(".{}", platform.shared_lib_extension));
  print_stat("Packages root", &config.packages_root().display().to_string());
  print_stat("Config file", &config_file().display().to_string());
  println!();
  print_list(
    "Toolchains:",
    platform.available_toolchains.iter().map(|t| t.as_str()),
  );
  Ok(())
}
