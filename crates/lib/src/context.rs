//! Explicit run context.
//!
//! Everything a component needs to know about the host and the project is carried
//! in [`BuildContext`] rather than read from the working directory or the ambient
//! environment.

use std::path::{Path, PathBuf};

use crate::consts::DEFAULT_ARTIFACT_NAME;
use crate::platform::{self, Os, paths};

/// External tools the orchestrator shells out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
  pub flutter: String,
  pub pod: String,
}

impl Toolchain {
  /// Resolve tool names from the environment, falling back to `flutter` and `pod`.
  pub fn from_env() -> Self {
    Self {
      flutter: paths::flutter_bin(),
      pod: paths::pod_bin(),
    }
  }
}

impl Default for Toolchain {
  fn default() -> Self {
    Self {
      flutter: crate::consts::DEFAULT_FLUTTER_BIN.to_string(),
      pod: crate::consts::DEFAULT_POD_BIN.to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct BuildContext {
  /// Root of the Flutter project; every toolchain path is relative to it.
  pub project_dir: PathBuf,
  /// Root of the release tree, one subdirectory per target.
  pub release_dir: PathBuf,
  /// Base name for staged artifacts (`<name>.ipa`, `<name>.aab`, ...).
  pub app_name: String,
  pub host: Option<Os>,
  pub cpu_count: usize,
  pub toolchain: Toolchain,
}

impl BuildContext {
  /// Context for `project_dir` on the current host with default settings.
  pub fn detect(project_dir: impl Into<PathBuf>) -> Self {
    let project_dir = project_dir.into();
    Self {
      release_dir: paths::release_dir(&project_dir),
      project_dir,
      app_name: DEFAULT_ARTIFACT_NAME.to_string(),
      host: Os::current(),
      cpu_count: platform::cpu_count(),
      toolchain: Toolchain::from_env(),
    }
  }

  pub fn with_release_dir(mut self, release_dir: impl Into<PathBuf>) -> Self {
    self.release_dir = release_dir.into();
    self
  }

  pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
    self.app_name = app_name.into();
    self
  }

  pub fn with_host(mut self, host: Option<Os>) -> Self {
    self.host = host;
    self
  }

  pub fn with_cpu_count(mut self, cpu_count: usize) -> Self {
    self.cpu_count = cpu_count.max(1);
    self
  }

  pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
    self.toolchain = toolchain;
    self
  }

  /// Path inside the project directory.
  pub fn project_path(&self, relative: impl AsRef<Path>) -> PathBuf {
    self.project_dir.join(relative)
  }

  /// Release subdirectory for a target.
  pub fn release_path(&self, target: platform::Target) -> PathBuf {
    self.release_dir.join(target.release_subdir())
  }
}
