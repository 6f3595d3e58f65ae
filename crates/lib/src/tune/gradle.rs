//! Gradle build settings.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::execute::types::Outcome;

/// A `key=value` line in `gradle.properties`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
  pub key: &'static str,
  pub value: &'static str,
}

impl Setting {
  pub const fn new(key: &'static str, value: &'static str) -> Self {
    Self { key, value }
  }

  /// A key counts as present if it appears anywhere in the file, under any value.
  pub fn is_present(&self, content: &str) -> bool {
    content.contains(self.key)
  }

  pub fn line(&self) -> String {
    format!("{}={}", self.key, self.value)
  }
}

/// Settings appended to `gradle.properties`, in order.
pub const GRADLE_SETTINGS: &[Setting] = &[
  Setting::new(
    "org.gradle.jvmargs",
    "-Xmx4g -XX:MaxPermSize=512m -XX:+HeapDumpOnOutOfMemoryError -Dfile.encoding=UTF-8",
  ),
  Setting::new("org.gradle.parallel", "true"),
  Setting::new("org.gradle.daemon", "true"),
  Setting::new("org.gradle.configureondemand", "true"),
  Setting::new("org.gradle.caching", "true"),
  Setting::new("android.enableR8", "true"),
  Setting::new("android.enableJetifier", "true"),
  Setting::new("android.useAndroidX", "true"),
  Setting::new("kotlin.code.style", "official"),
];

/// Append every setting missing from `content`, each on its own line.
pub fn merge_settings(content: &str, settings: &[Setting]) -> String {
  let mut merged = content.to_string();
  for setting in settings.iter().filter(|s| !s.is_present(content)) {
    if !merged.is_empty() && !merged.ends_with('\n') {
      merged.push('\n');
    }
    merged.push_str(&setting.line());
    merged.push('\n');
  }
  merged
}

/// Merge [`GRADLE_SETTINGS`] into the properties file at `path`. Absent file: no-op.
pub fn tune_gradle_properties(path: &Path) -> Outcome {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = %path.display(), "no gradle.properties, skipping");
      return Outcome::Ok;
    }
    Err(e) => {
      warn!(path = %path.display(), error = %e, "failed to read gradle.properties");
      return Outcome::Warning(format!("failed to read {}: {e}", path.display()));
    }
  };

  let merged = merge_settings(&content, GRADLE_SETTINGS);
  if merged == content {
    debug!(path = %path.display(), "gradle.properties already tuned");
    return Outcome::Ok;
  }

  match fs::write(path, merged) {
    Ok(()) => {
      info!(path = %path.display(), "gradle.properties tuned");
      Outcome::Ok
    }
    Err(e) => {
      warn!(path = %path.display(), error = %e, "failed to write gradle.properties");
      Outcome::Warning(format!("failed to write {}: {e}", path.display()))
    }
  }
}
