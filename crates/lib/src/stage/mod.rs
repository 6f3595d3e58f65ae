//! Artifact staging.
//!
//! Copies toolchain outputs into the release tree under fixed, predictable names.
//! Staging is always best-effort: a missing or uncopyable artifact is reported as
//! [`Outcome::Warning`] and never aborts the run.

pub mod archive;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::execute::types::Outcome;
use crate::util::fs::{copy_dir_all, copy_file, remove_path};

/// Where an artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
  /// A fixed file or directory.
  Path(PathBuf),
  /// The first entry of `dir` whose name ends with `suffix`.
  FirstWithSuffix { dir: PathBuf, suffix: String },
}

/// One artifact to copy into the release tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCopyRule {
  pub source: ArtifactSource,
  pub destination: PathBuf,
  /// Label used in log lines, e.g. `Android-APK`.
  pub label: String,
}

impl ArtifactCopyRule {
  pub fn path(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, label: impl Into<String>) -> Self {
    Self {
      source: ArtifactSource::Path(source.into()),
      destination: destination.into(),
      label: label.into(),
    }
  }

  pub fn first_with_suffix(
    dir: impl Into<PathBuf>,
    suffix: impl Into<String>,
    destination: impl Into<PathBuf>,
    label: impl Into<String>,
  ) -> Self {
    Self {
      source: ArtifactSource::FirstWithSuffix {
        dir: dir.into(),
        suffix: suffix.into(),
      },
      destination: destination.into(),
      label: label.into(),
    }
  }

  /// Resolve the source and copy it. Never fails the caller.
  pub fn apply(&self) -> Outcome {
    match &self.source {
      ArtifactSource::Path(source) => copy_artifact(source, &self.destination, &self.label),
      ArtifactSource::FirstWithSuffix { dir, suffix } => match find_bundle(dir, suffix) {
        Ok(source) => copy_artifact(&source, &self.destination, &self.label),
        Err(reason) => {
          warn!(label = %self.label, "{reason}");
          Outcome::Warning(reason)
        }
      },
    }
  }
}

/// Create the release directory if needed and return it. Safe to call repeatedly.
pub fn ensure_release_dir(root: &Path) -> io::Result<&Path> {
  fs::create_dir_all(root)?;
  Ok(root)
}

/// Copy `source` to `destination`.
///
/// A directory source fully replaces an existing destination (no merging); a file
/// source overwrites it, keeping permissions and modification time.
pub fn copy_artifact(source: &Path, destination: &Path, label: &str) -> Outcome {
  if !source.exists() {
    let message = format!("build output not found: {}", source.display());
    warn!(label, "{message}");
    return Outcome::Warning(message);
  }

  match copy_replacing(source, destination) {
    Ok(()) => {
      info!(label, destination = %destination.display(), "artifact staged");
      Outcome::Ok
    }
    Err(e) => {
      let message = format!("failed to copy {} to {}: {e}", source.display(), destination.display());
      warn!(label, error = %e, "{message}");
      Outcome::Warning(message)
    }
  }
}

fn copy_replacing(source: &Path, destination: &Path) -> io::Result<()> {
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent)?;
  }

  if source.is_dir() {
    remove_path(destination)?;
    copy_dir_all(source, destination)
  } else {
    if destination.is_dir() {
      fs::remove_dir_all(destination)?;
    }
    copy_file(source, destination)
  }
}

/// Find the first entry in `dir` (by name) ending with `suffix`.
///
/// Returns a human-readable reason when the directory is missing or holds no match.
pub fn find_bundle(dir: &Path, suffix: &str) -> Result<PathBuf, String> {
  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      return Err(format!("build output directory not found: {}", dir.display()));
    }
    Err(e) => return Err(format!("failed to read {}: {e}", dir.display())),
  };

  let mut matches: Vec<PathBuf> = entries
    .filter_map(|e| e.ok())
    .filter(|e| e.file_name().to_string_lossy().ends_with(suffix))
    .map(|e| e.path())
    .collect();
  matches.sort();

  matches
    .into_iter()
    .next()
    .ok_or_else(|| format!("no {suffix} bundle found in {}", dir.display()))
}
