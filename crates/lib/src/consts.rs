//! Application-wide constants.

/// Application name used for config/data directories and env var prefixes.
pub const APP_NAME: &str = "fembuild";

/// Length of the truncated plan fingerprint.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Environment variable overriding the packages root used to locate dependencies.
pub const PACKAGES_ROOT_ENV: &str = "FEMBUILD_PACKAGES_ROOT";

/// Environment variable overriding the install prefix.
pub const PREFIX_ENV: &str = "FEMBUILD_PREFIX";

/// Default packages root when neither config nor environment set one.
#[cfg(target_os = "macos")]
pub const DEFAULT_PACKAGES_ROOT: &str = "/usr/local";

/// Default packages root when neither config nor environment set one.
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_PACKAGES_ROOT: &str = "/home/linuxbrew/.linuxbrew";

/// Name of the scratch build directory created inside the source tree.
pub const BUILD_DIR_NAME: &str = "build";

/// Label of the payload's quick test suite.
pub const QUICK_TEST_LABEL: &str = "quick";
