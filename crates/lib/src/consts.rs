//! Fixed names shared across the crate.

pub const APP_NAME: &str = "shipyard";

/// Base name for staged artifacts when none is configured.
pub const DEFAULT_ARTIFACT_NAME: &str = "App";

/// Name of the release directory created under the project root.
pub const RELEASE_DIR_NAME: &str = "release";

pub const DEFAULT_FLUTTER_BIN: &str = "flutter";
pub const DEFAULT_POD_BIN: &str = "pod";

pub const RELEASE_DIR_ENV: &str = "SHIPYARD_RELEASE_DIR";
pub const FLUTTER_BIN_ENV: &str = "SHIPYARD_FLUTTER";
pub const POD_BIN_ENV: &str = "SHIPYARD_POD";
