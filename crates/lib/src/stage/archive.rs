//! Archive packaging.
//!
//! Repacks an iOS `.app` bundle into an installable `.ipa`: a deflate zip whose
//! single top-level entry is `Payload/<bundle>.app/`.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::util::fs::{copy_dir_all, remove_path};

/// Name of the staging directory; it becomes the archive's top-level entry.
pub const STAGING_DIR_NAME: &str = "Payload";

#[derive(Debug, Error)]
pub enum PackageError {
  /// The bundle to package does not exist (the build did not produce it).
  #[error("app bundle not found: {}", path.display())]
  BundleMissing { path: PathBuf },

  #[error("{context}: {source}")]
  Io {
    context: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to write archive: {0}")]
  Zip(#[from] zip::result::ZipError),
}

impl PackageError {
  fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> PackageError {
    let context = context.into();
    move |source| PackageError::Io { context, source }
  }
}

/// What to package and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSpec {
  /// The `.app` bundle directory.
  pub bundle: PathBuf,
  /// Directory holding the staging directory and the intermediate zip.
  pub work_dir: PathBuf,
  /// Final archive path; an existing file there is replaced.
  pub output: PathBuf,
}

/// Removes the staging directory when dropped, and the intermediate archive too
/// unless the run completed.
struct Scratch {
  staging: PathBuf,
  intermediate: PathBuf,
  completed: bool,
}

impl Drop for Scratch {
  fn drop(&mut self) {
    if let Err(e) = remove_path(&self.staging) {
      warn!(path = %self.staging.display(), error = %e, "failed to remove staging directory");
    }
    if !self.completed
      && let Err(e) = remove_path(&self.intermediate)
    {
      warn!(path = %self.intermediate.display(), error = %e, "failed to remove partial archive");
    }
  }
}

/// Package `spec.bundle` into `spec.output`.
///
/// The staging directory is removed on every exit path. On failure the partial
/// intermediate archive is removed as well and `spec.output` is left untouched.
pub fn package_bundle(spec: &ArchiveSpec) -> Result<PathBuf, PackageError> {
  if !spec.bundle.is_dir() {
    return Err(PackageError::BundleMissing {
      path: spec.bundle.clone(),
    });
  }
  let bundle_name = spec.bundle.file_name().ok_or_else(|| PackageError::BundleMissing {
    path: spec.bundle.clone(),
  })?;

  let mut scratch = Scratch {
    staging: spec.work_dir.join(STAGING_DIR_NAME),
    intermediate: spec.work_dir.join(format!("{STAGING_DIR_NAME}.zip")),
    completed: false,
  };

  remove_path(&scratch.staging).map_err(PackageError::io("failed to clear staging directory"))?;
  fs::create_dir_all(&scratch.staging).map_err(PackageError::io("failed to create staging directory"))?;
  copy_dir_all(&spec.bundle, &scratch.staging.join(bundle_name))
    .map_err(PackageError::io("failed to copy bundle into staging directory"))?;

  remove_path(&scratch.intermediate).map_err(PackageError::io("failed to clear previous archive"))?;
  write_archive(&scratch.staging, &scratch.intermediate)?;

  remove_path(&spec.output).map_err(PackageError::io(format!("failed to replace {}", spec.output.display())))?;
  fs::rename(&scratch.intermediate, &spec.output)
    .map_err(PackageError::io(format!("failed to move archive to {}", spec.output.display())))?;
  scratch.completed = true;

  info!(archive = %spec.output.display(), "archive created");
  Ok(spec.output.clone())
}

/// Zip every file under `staging` into `archive`, naming entries relative to the
/// staging directory's parent.
fn write_archive(staging: &Path, archive: &Path) -> Result<(), PackageError> {
  let root = staging.parent().unwrap_or(staging);
  let file = File::create(archive).map_err(PackageError::io(format!("failed to create {}", archive.display())))?;
  let mut zip = ZipWriter::new(file);

  for entry in WalkDir::new(staging).follow_links(true).sort_by_file_name() {
    let entry = entry.map_err(|e| PackageError::Io {
      context: "failed to walk staging directory".to_string(),
      source: e.into(),
    })?;
    if !entry.file_type().is_file() {
      continue;
    }

    let relative = entry.path().strip_prefix(root).map_err(|e| PackageError::Io {
      context: format!("unexpected path {}", entry.path().display()),
      source: io::Error::other(e),
    })?;
    let name = entry_name(relative);
    debug!(entry = %name, "adding archive entry");

    let options = SimpleFileOptions::default()
      .compression_method(CompressionMethod::Deflated)
      .unix_permissions(file_mode(entry.path()));
    zip.start_file(name, options)?;

    let mut source = File::open(entry.path()).map_err(PackageError::io(format!("failed to read {}", entry.path().display())))?;
    io::copy(&mut source, &mut zip).map_err(PackageError::io("failed to write archive entry"))?;
  }

  zip.finish()?;
  Ok(())
}

/// Archive entry names always use `/`, whatever the host separator.
fn entry_name(relative: &Path) -> String {
  relative
    .components()
    .filter_map(|c| match c {
      Component::Normal(part) => Some(part.to_string_lossy()),
      _ => None,
    })
    .collect::<Vec<_>>()
    .join("/")
}

#[cfg(unix)]
fn file_mode(path: &Path) -> u32 {
  use std::os::unix::fs::PermissionsExt;
  fs::metadata(path).map(|m| m.permissions().mode() & 0o7777).unwrap_or(0o644)
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> u32 {
  0o644
}
