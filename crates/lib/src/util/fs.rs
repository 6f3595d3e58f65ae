//! Filesystem helpers.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use walkdir::WalkDir;

/// Recursively copy `src` into `dst`, creating `dst`.
///
/// Symlinks are followed, so the copy holds their targets' content. File
/// permissions are preserved by `fs::copy`.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
  fs::create_dir_all(dst)?;

  for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
    let entry = entry.map_err(io::Error::other)?;
    let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
    let target = dst.join(relative);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&target)?;
    } else {
      copy_file(entry.path(), &target)?;
    }
  }

  Ok(())
}

/// Copy a single file, preserving permissions and modification time.
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<()> {
  fs::copy(src, dst)?;
  let modified = fs::metadata(src)?.modified()?;
  set_modified(dst, modified)
}

// The copy may already carry a read-only mode. On Unix the owner can update
// timestamps through a read-only handle.
#[cfg(unix)]
fn set_modified(path: &Path, modified: SystemTime) -> io::Result<()> {
  fs::File::open(path)?.set_modified(modified)
}

#[cfg(not(unix))]
fn set_modified(path: &Path, modified: SystemTime) -> io::Result<()> {
  let mut permissions = fs::metadata(path)?.permissions();
  if !permissions.readonly() {
    return fs::File::options().write(true).open(path)?.set_modified(modified);
  }
  #[allow(clippy::permissions_set_readonly_false)]
  permissions.set_readonly(false);
  fs::set_permissions(path, permissions.clone())?;
  let result = fs::File::options().write(true).open(path)?.set_modified(modified);
  permissions.set_readonly(true);
  fs::set_permissions(path, permissions)?;
  result
}

/// Remove a file or directory tree. Missing paths are not an error.
pub fn remove_path(path: &Path) -> io::Result<bool> {
  match fs::symlink_metadata(path) {
    Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map(|_| true),
    Ok(_) => fs::remove_file(path).map(|_| true),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(e),
  }
}

/// Total size in bytes of the regular files under `path`.
pub fn dir_size(path: &Path) -> u64 {
  WalkDir::new(path)
    .into_iter()
    .filter_map(|e| e.ok())
    .filter(|e| e.file_type().is_file())
    .filter_map(|e| e.metadata().ok())
    .map(|m| m.len())
    .sum()
}
