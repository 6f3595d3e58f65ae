//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Stand-in for the Flutter tool.
///
/// Logs its arguments to `$FAKE_FLUTTER_LOG`, writes the files a real release
/// build would produce, and fails the platforms listed in `$FAKE_FLUTTER_FAIL`.
const FAKE_FLUTTER: &str = r#"#!/bin/sh
if [ -n "$FAKE_FLUTTER_LOG" ]; then echo "$*" >> "$FAKE_FLUTTER_LOG"; fi
case "$*" in
  *"build apk"*)
    case "$FAKE_FLUTTER_FAIL" in *apk*) echo "Gradle build failed" >&2; exit 1;; esac
    mkdir -p build/app/outputs/flutter-apk
    echo arm > build/app/outputs/flutter-apk/app-armeabi-v7a-release.apk
    echo arm64 > build/app/outputs/flutter-apk/app-arm64-v8a-release.apk
    ;;
  *"build appbundle"*)
    mkdir -p build/app/outputs/bundle/release
    echo aab > build/app/outputs/bundle/release/app-release.aab
    ;;
  *"build web"*)
    case "$FAKE_FLUTTER_FAIL" in *web*) echo "dart2js failed" >&2; exit 1;; esac
    mkdir -p build/web
    echo '<html></html>' > build/web/index.html
    ;;
esac
exit 0
"#;

const FAKE_POD: &str = "#!/bin/sh\nexit 0\n";

/// Isolated Flutter project with a fake toolchain.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };
    env.write_file("app/pubspec.yaml", "name: demo\n");
    env.write_script("bin/flutter", FAKE_FLUTTER);
    env.write_script("bin/pod", FAKE_POD);
    env
  }

  /// The Flutter project directory.
  pub fn project(&self) -> PathBuf {
    let p = self.temp.path().join("app");
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Path inside the project directory.
  pub fn path(&self, relative: &str) -> PathBuf {
    self.project().join(relative)
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  fn write_script(&self, relative_path: &str, content: &str) {
    self.write_file(relative_path, content);
    let path = self.temp.path().join(relative_path);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  /// Every command line the fake Flutter tool received.
  pub fn flutter_log(&self) -> Vec<String> {
    std::fs::read_to_string(self.log_path())
      .map(|s| s.lines().map(str::to_string).collect())
      .unwrap_or_default()
  }

  fn log_path(&self) -> PathBuf {
    self.temp.path().join("flutter.log")
  }

  /// A pre-configured Command for the shipyard binary.
  ///
  /// Runs inside the project with the fake toolchain on `SHIPYARD_FLUTTER` and
  /// `SHIPYARD_POD`, and without any inherited release directory override.
  pub fn shipyard_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("shipyard");
    cmd.current_dir(self.project());
    cmd.env("SHIPYARD_FLUTTER", self.temp.path().join("bin/flutter"));
    cmd.env("SHIPYARD_POD", self.temp.path().join("bin/pod"));
    cmd.env("FAKE_FLUTTER_LOG", self.log_path());
    cmd.env_remove("SHIPYARD_RELEASE_DIR");
    cmd.env_remove("FAKE_FLUTTER_FAIL");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}

pub fn read(path: &Path) -> String {
  std::fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}
