use std::path::{Path, PathBuf};

use crate::consts::{
  DEFAULT_FLUTTER_BIN, DEFAULT_POD_BIN, FLUTTER_BIN_ENV, POD_BIN_ENV, RELEASE_DIR_ENV, RELEASE_DIR_NAME,
};

/// Returns the release directory for a project.
///
/// `SHIPYARD_RELEASE_DIR` overrides the default of `<project>/release`.
pub fn release_dir(project_dir: &Path) -> PathBuf {
  std::env::var(RELEASE_DIR_ENV)
    .ok()
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .unwrap_or_else(|| project_dir.join(RELEASE_DIR_NAME))
}

/// Returns the Flutter executable to invoke
pub fn flutter_bin() -> String {
  env_or(FLUTTER_BIN_ENV, DEFAULT_FLUTTER_BIN)
}

/// Returns the CocoaPods executable to invoke
pub fn pod_bin() -> String {
  env_or(POD_BIN_ENV, DEFAULT_POD_BIN)
}

fn env_or(var: &str, default: &str) -> String {
  std::env::var(var)
    .ok()
    .filter(|v| !v.is_empty())
    .unwrap_or_else(|| default.to_string())
}
