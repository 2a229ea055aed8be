//! Process exit codes.

use fembuild_lib::orchestrate::{BuildError, BuildStage};
use fembuild_lib::smoke::SmokeError;

pub const OK: u8 = 0;
/// Usage, configuration and internal errors.
pub const USAGE: u8 = 1;
pub const CONFIGURE: u8 = 2;
pub const COMPILE: u8 = 3;
pub const INSTALL: u8 = 4;
/// The quick test suite failed; the installed tree is kept.
pub const VERIFY: u8 = 5;
pub const SMOKE: u8 = 6;
pub const PROVISION: u8 = 7;

pub fn for_stage(stage: BuildStage) -> u8 {
  match stage {
    BuildStage::Configure => CONFIGURE,
    BuildStage::Compile => COMPILE,
    BuildStage::Install => INSTALL,
    BuildStage::Verify => VERIFY,
  }
}

/// Map an error from any command onto its exit code.
pub fn for_error(err: &anyhow::Error) -> u8 {
  if let Some(build) = err.downcast_ref::<BuildError>() {
    match build {
      BuildError::ProvisionFailed { .. } | BuildError::ProvisionSpawn(_) => PROVISION,
      other => other.stage().map(for_stage).unwrap_or(USAGE),
    }
  } else if err.downcast_ref::<SmokeError>().is_some_and(is_smoke_failure) {
    SMOKE
  } else {
    USAGE
  }
}

/// A suite that could not even be loaded, or a scratch dir that was not
/// usable, is a usage error rather than a failed test.
fn is_smoke_failure(err: &SmokeError) -> bool {
  !matches!(err, SmokeError::Load { .. } | SmokeError::ScratchNotEmpty { .. })
}
