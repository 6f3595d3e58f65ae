use predicates::prelude::*;
use serial_test::serial;

use crate::common::{TestEnv, read};

#[test]
#[serial]
fn web_build_is_staged_into_release() {
  let env = TestEnv::new();

  env
    .shipyard_cmd()
    .args(["build", "--platforms", "web"])
    .assert()
    .success()
    .stdout(predicate::str::contains("web"));

  assert_eq!(read(&env.path("release/Web/index.html")), "<html></html>\n");
  assert_eq!(
    env.flutter_log(),
    vec!["precache --web", "pub get", "build web --release --dart2js-optimization=O4"]
  );
}

#[test]
#[serial]
fn android_artifacts_use_app_name() {
  let env = TestEnv::new();

  env
    .shipyard_cmd()
    .args(["build", "--platforms", "android", "--app-name", "Demo"])
    .assert()
    .success();

  assert_eq!(read(&env.path("release/Android/Demo-arm.apk")), "arm\n");
  assert_eq!(read(&env.path("release/Android/Demo-arm64.apk")), "arm64\n");
  assert_eq!(read(&env.path("release/Android/Demo.aab")), "aab\n");
}

#[test]
#[serial]
fn failing_android_does_not_stop_web() {
  let env = TestEnv::new();

  env
    .shipyard_cmd()
    .args(["build", "--platforms", "android", "web"])
    .env("FAKE_FLUTTER_FAIL", "apk")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Gradle build failed"));

  assert!(env.path("release/Web/index.html").exists());
  assert!(!env.path("release/Android/App.aab").exists());
}

#[test]
#[serial]
fn parallel_json_reports_each_platform_once() {
  let env = TestEnv::new();

  let output = env
    .shipyard_cmd()
    .args(["build", "-p", "--platforms", "android,web", "--output", "json"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["status"], "success");
  assert_eq!(report["summary"]["mode"], "parallel");
  let mut targets: Vec<&str> = report["summary"]["results"]
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["target"].as_str().unwrap())
    .collect();
  targets.sort();
  assert_eq!(targets, vec!["android", "web"]);
}

#[test]
#[serial]
#[cfg(not(target_os = "macos"))]
fn apple_only_request_has_nothing_to_do() {
  let env = TestEnv::new();

  env
    .shipyard_cmd()
    .args(["build", "--platforms", "ios", "macos"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No platforms to build"));

  assert!(env.flutter_log().is_empty());
}

#[test]
#[serial]
fn clean_flag_alone_only_cleans() {
  let env = TestEnv::new();
  env.write_file("app/build/stale.txt", "old");
  env.write_file("app/pubspec.lock", "lock");

  env
    .shipyard_cmd()
    .args(["build", "-c"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to build"));

  assert_eq!(env.flutter_log(), vec!["clean"]);
  assert!(!env.path("build").exists());
  assert!(!env.path("pubspec.lock").exists());
  assert!(!env.path("release").exists());
}

#[test]
#[serial]
fn clean_temp_purges_after_success() {
  let env = TestEnv::new();

  env
    .shipyard_cmd()
    .args(["build", "--platforms", "web", "-t"])
    .assert()
    .success();

  assert!(!env.path("build/web").exists());
  assert!(env.path("release/Web/index.html").exists());
}

#[test]
#[serial]
fn release_dir_can_be_redirected() {
  let env = TestEnv::new();
  let out = env.temp.path().join("out");

  env
    .shipyard_cmd()
    .args(["build", "--platforms", "web"])
    .env("SHIPYARD_RELEASE_DIR", &out)
    .assert()
    .success();

  assert!(out.join("Web/index.html").exists());
  assert!(!env.path("release").exists());
}
