//! Project cleaning.
//!
//! Two flavours: a full project clean (`flutter clean` plus dependency caches and
//! lock files), and a purge of transient per-platform build directories after a
//! successful release build. Both are best-effort: a path that cannot be removed
//! is reported and the rest still go.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::BuildContext;
use crate::execute::runner::{CommandRunner, CommandSpec};
use crate::util::fs::{dir_size, remove_path};

/// Removed by a full project clean, relative to the project directory.
pub const CLEAN_PATHS: &[&str] = &[
  "build",
  ".dart_tool",
  ".flutter-plugins",
  ".flutter-plugins-dependencies",
  "ios/Pods",
  "ios/Podfile.lock",
  "android/.gradle",
  "pubspec.lock",
];

/// Transient build directories removed after a successful release build.
pub const TRANSIENT_PATHS: &[&str] = &[
  "build/ios",
  "build/android",
  "build/macos",
  "build/web",
  ".dart_tool/flutter_build",
  "ios/build",
  "android/build",
  "android/app/build",
  "macos/build",
];

#[derive(Debug, Clone, Serialize)]
pub struct CleanFailure {
  pub path: PathBuf,
  pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanStats {
  pub removed: Vec<PathBuf>,
  pub failed: Vec<CleanFailure>,
  pub bytes_freed: u64,
  /// Diagnostics of a failed `flutter clean`, if it was run and failed.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub toolchain_warning: Option<String>,
}

impl CleanStats {
  pub fn is_clean(&self) -> bool {
    self.failed.is_empty() && self.toolchain_warning.is_none()
  }
}

/// Run `flutter clean` and remove caches and lock files.
pub fn clean_project(ctx: &BuildContext, runner: &CommandRunner) -> CleanStats {
  info!(project = %ctx.project_dir.display(), "cleaning project");

  let flutter_clean = CommandSpec::new(&ctx.toolchain.flutter)
    .arg("clean")
    .current_dir(&ctx.project_dir);
  let toolchain_warning = match runner.run(&flutter_clean, "clean") {
    Ok(_) => None,
    Err(e) => {
      warn!(error = %e, "flutter clean failed, removing files directly");
      Some(e.diagnostics())
    }
  };

  let mut stats = remove_all(&ctx.project_dir, CLEAN_PATHS);
  stats.toolchain_warning = toolchain_warning;

  info!(removed = stats.removed.len(), bytes_freed = stats.bytes_freed, "project clean complete");
  stats
}

/// Remove transient per-platform build directories.
pub fn purge_build_files(ctx: &BuildContext) -> CleanStats {
  info!(project = %ctx.project_dir.display(), "purging transient build files");
  let stats = remove_all(&ctx.project_dir, TRANSIENT_PATHS);
  info!(removed = stats.removed.len(), bytes_freed = stats.bytes_freed, "purge complete");
  stats
}

fn remove_all(root: &Path, relative: &[&str]) -> CleanStats {
  let mut stats = CleanStats::default();

  for rel in relative {
    let path = root.join(rel);
    let size = if path.is_dir() {
      dir_size(&path)
    } else {
      path.metadata().map(|m| m.len()).unwrap_or(0)
    };

    match remove_path(&path) {
      Ok(true) => {
        debug!(path = %path.display(), bytes = size, "removed");
        stats.bytes_freed += size;
        stats.removed.push(path);
      }
      Ok(false) => debug!(path = %path.display(), "not present"),
      Err(e) => {
        warn!(path = %path.display(), error = %e, "failed to remove");
        stats.failed.push(CleanFailure {
          path,
          error: e.to_string(),
        });
      }
    }
  }

  stats
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::context::Toolchain;
  use crate::util::testutil::{FakeExecutor, write_file};
  use std::sync::Arc;
  use tempfile::TempDir;

  fn context(temp: &TempDir) -> BuildContext {
    BuildContext::detect(temp.path())
      .with_release_dir(temp.path().join("release"))
      .with_toolchain(Toolchain::default())
  }

  #[test]
  fn clean_runs_flutter_and_removes_caches() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("build/app/out.apk"), "12345");
    write_file(&temp.path().join("pubspec.lock"), "lock");
    write_file(&temp.path().join("ios/Pods/Manifest.lock"), "");
    write_file(&temp.path().join("lib/main.dart"), "void main() {}");
    let fake = Arc::new(FakeExecutor::new());

    let stats = clean_project(&context(&temp), &CommandRunner::new(fake.clone()));

    assert_eq!(fake.calls(), vec!["flutter clean"]);
    assert_eq!(stats.removed.len(), 3);
    assert_eq!(stats.bytes_freed, 9);
    assert!(stats.is_clean());
    assert!(!temp.path().join("build").exists());
    assert!(temp.path().join("lib/main.dart").exists());
  }

  #[test]
  fn failing_flutter_clean_still_removes_files() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join(".dart_tool/package_config.json"), "{}");
    let runner = CommandRunner::new(Arc::new(FakeExecutor::new().fail_when("clean", "no flutter")));

    let stats = clean_project(&context(&temp), &runner);

    assert!(!temp.path().join(".dart_tool").exists());
    assert!(stats.toolchain_warning.is_some_and(|w| w.contains("no flutter")));
  }

  #[test]
  fn purge_keeps_release_and_other_build_output() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("build/web/index.html"), "<html>");
    write_file(&temp.path().join("android/app/build/intermediates/x"), "x");
    write_file(&temp.path().join("build/app/outputs/bundle/release/app-release.aab"), "aab");
    write_file(&temp.path().join("release/Web/index.html"), "<html>");

    let stats = purge_build_files(&context(&temp));

    assert_eq!(
      stats.removed,
      vec![temp.path().join("build/web"), temp.path().join("android/app/build")]
    );
    assert!(temp.path().join("build/app/outputs/bundle/release/app-release.aab").exists());
    assert!(temp.path().join("release/Web/index.html").exists());
  }

  #[test]
  fn purge_on_empty_project_is_noop() {
    let temp = TempDir::new().unwrap();
    let stats = purge_build_files(&context(&temp));
    assert!(stats.removed.is_empty());
    assert_eq!(stats.bytes_freed, 0);
  }
}
