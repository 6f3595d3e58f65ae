use predicates::prelude::*;
use serial_test::serial;

use crate::common::TestEnv;

#[test]
#[serial]
fn clean_removes_caches_and_lock_files() {
  let env = TestEnv::new();
  env.write_file("app/.dart_tool/package_config.json", "{}");
  env.write_file("app/ios/Podfile.lock", "PODS:");
  env.write_file("app/lib/main.dart", "void main() {}");

  env
    .shipyard_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Project cleaned"));

  assert!(!env.path(".dart_tool").exists());
  assert!(!env.path("ios/Podfile.lock").exists());
  assert!(env.path("lib/main.dart").exists());
  assert_eq!(env.flutter_log(), vec!["clean"]);
}

#[test]
#[serial]
fn clean_temp_reports_removed_paths_as_json() {
  let env = TestEnv::new();
  env.write_file("app/build/web/main.dart.js", "12345");
  env.write_file("app/build/app/outputs/app.apk", "apk");

  let output = env
    .shipyard_cmd()
    .args(["clean", "--temp", "--output", "json"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(stats["bytes_freed"], 5);
  assert_eq!(stats["removed"].as_array().unwrap().len(), 1);
  assert!(env.path("build/app/outputs/app.apk").exists());
  assert!(env.flutter_log().is_empty());
}
