//! CocoaPods and Xcode build settings.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::execute::types::Outcome;

/// Disables CocoaPods analytics, which otherwise run synchronously during `pod install`.
pub const TELEMETRY_MARKER: &str = "ENV['COCOAPODS_DISABLE_STATS'] = 'true'";
const TELEMETRY_KEY: &str = "COCOAPODS_DISABLE_STATS";
const TELEMETRY_COMMENT: &str =
  "# CocoaPods analytics sends network stats synchronously affecting flutter build latency.";

pub const INSTALLER_MARKER: &str = "install! 'cocoapods', :deterministic_uuids => false";
const INSTALLER_KEY: &str = "install! 'cocoapods'";

/// The installer marker goes right before the first occurrence of this call.
const SETUP_ANCHOR: &str = "flutter_ios_podfile_setup";

/// Return the Podfile content with both markers applied, or `None` if nothing changes.
pub fn apply_podfile_markers(content: &str) -> Option<String> {
  let has_telemetry = content.contains(TELEMETRY_KEY);
  let has_installer = content.contains(INSTALLER_KEY);
  if has_telemetry && has_installer {
    return None;
  }

  let mut updated = content.to_string();

  if !has_installer && let Some(pos) = updated.find(SETUP_ANCHOR) {
    updated.insert_str(pos, &format!("{INSTALLER_MARKER}\n"));
  }

  if !has_telemetry {
    updated = format!("{TELEMETRY_COMMENT}\n{TELEMETRY_MARKER}\n\n{updated}");
  }

  (updated != content).then_some(updated)
}

/// Apply [`apply_podfile_markers`] to the Podfile at `path`, writing only on change.
pub fn tune_podfile(path: &Path) -> Outcome {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = %path.display(), "no Podfile, skipping");
      return Outcome::Ok;
    }
    Err(e) => return write_warning("failed to read", path, e),
  };

  let Some(updated) = apply_podfile_markers(&content) else {
    debug!(path = %path.display(), "Podfile already tuned");
    return Outcome::Ok;
  };

  match fs::write(path, updated) {
    Ok(()) => {
      info!(path = %path.display(), "Podfile tuned");
      Outcome::Ok
    }
    Err(e) => write_warning("failed to write", path, e),
  }
}

/// Lines of a freshly created `.xcode.env`.
pub fn xcode_env_lines(cpu_count: usize) -> Vec<String> {
  vec![
    "FLUTTER_BUILD_MODE=release".to_string(),
    format!("FLUTTER_BUILD_NUMBER={cpu_count}"),
    "FLUTTER_XCODE_STRIP_SYMBOLS=true".to_string(),
    "BITCODE_GENERATION_MODE=none".to_string(),
    "SWIFT_OPTIMIZATION_LEVEL=-Osize".to_string(),
  ]
}

/// Create `.xcode.env` at `path` if it does not exist. An existing file is never touched.
///
/// Nothing is created when the parent directory (the iOS project) is missing.
pub fn ensure_xcode_env(path: &Path, cpu_count: usize) -> Outcome {
  if path.exists() {
    debug!(path = %path.display(), "xcode env file already present");
    return Outcome::Ok;
  }
  if path.parent().is_some_and(|p| !p.is_dir()) {
    debug!(path = %path.display(), "no iOS project directory, skipping xcode env file");
    return Outcome::Ok;
  }

  let mut content = xcode_env_lines(cpu_count).join("\n");
  content.push('\n');

  match fs::write(path, content) {
    Ok(()) => {
      info!(path = %path.display(), "created xcode env file");
      Outcome::Ok
    }
    Err(e) => write_warning("failed to create", path, e),
  }
}

fn write_warning(action: &str, path: &Path, error: io::Error) -> Outcome {
  let message = format!("{action} {}: {error}", path.display());
  warn!(path = %path.display(), error = %error, "{action} config file");
  Outcome::Warning(message)
}
