use serial_test::serial;

use crate::common::{TestEnv, read};

#[test]
#[serial]
fn optimize_is_idempotent() {
  let env = TestEnv::new();
  env.write_file("app/android/gradle.properties", "org.gradle.jvmargs=-Xmx1536M\n");
  env.write_file("app/ios/Podfile", "platform :ios, '12.0'\nflutter_ios_podfile_setup\n");

  env.shipyard_cmd().arg("optimize").assert().success();
  let gradle = read(&env.path("android/gradle.properties"));
  let podfile = read(&env.path("ios/Podfile"));

  env.shipyard_cmd().arg("optimize").assert().success();

  assert_eq!(read(&env.path("android/gradle.properties")), gradle);
  assert_eq!(read(&env.path("ios/Podfile")), podfile);
  assert!(gradle.contains("org.gradle.caching=true"));
  assert!(gradle.contains("org.gradle.jvmargs=-Xmx1536M"));
  assert!(podfile.contains("ENV['COCOAPODS_DISABLE_STATS'] = 'true'"));
  assert!(env.path("ios/.xcode.env").exists());
}

#[test]
#[serial]
fn optimize_selected_platform_only() {
  let env = TestEnv::new();
  env.write_file("app/android/gradle.properties", "");
  env.write_file("app/ios/Podfile", "flutter_ios_podfile_setup\n");

  env
    .shipyard_cmd()
    .args(["optimize", "--platforms", "android"])
    .assert()
    .success();

  assert!(read(&env.path("android/gradle.properties")).contains("android.useAndroidX=true"));
  assert_eq!(read(&env.path("ios/Podfile")), "flutter_ios_podfile_setup\n");
  assert_eq!(env.flutter_log(), vec!["precache --android"]);
}

#[test]
#[serial]
fn build_with_platforms_tunes_those_platforms() {
  let env = TestEnv::new();
  env.write_file("app/android/gradle.properties", "");

  env
    .shipyard_cmd()
    .args(["build", "--platforms", "web"])
    .assert()
    .success();

  assert_eq!(read(&env.path("android/gradle.properties")), "");
  assert!(env.flutter_log().contains(&"precache --web".to_string()));
}
