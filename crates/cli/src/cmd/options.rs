use anyhow::Result;
use serde::Serialize;

use fembuild_lib::options::{DefaultState, Feature};

use crate::output::{OutputFormat, print_json};

#[derive(Serialize)]
struct OptionRow {
  name: &'static str,
  default: DefaultState,
  description: &'static str,
}

pub fn cmd_options(output: OutputFormat) -> Result<()> {
  let rows: Vec<OptionRow> = Feature::ALL
    .iter()
    .map(|feature| {
      let decl = feature.decl();
      OptionRow {
        name: feature.name(),
        default: decl.default,
        description: decl.description,
      }
    })
    .collect();

  if output.is_json() {
    return print_json(&rows);
  }

  for row in &rows {
    let default = match row.default {
      DefaultState::Recommended => "on",
      DefaultState::Optional => "off",
    };
    println!("  {:<20} {:<4} {}", row.name, default, row.description);
  }
  Ok(())
}
