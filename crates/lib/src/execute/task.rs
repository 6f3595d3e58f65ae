//! Per-platform build tasks.
//!
//! A [`BuildTask`] is the fixed recipe for one target: an optional prepare
//! command, then one or more stages of `command → packaging → artifact copies`.
//! The first command or packaging failure ends the task; artifact copy problems
//! are collected as warnings.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{error, info};

use crate::context::BuildContext;
use crate::execute::runner::{CommandRunner, CommandSpec};
use crate::execute::types::{BuildResult, Outcome};
use crate::platform::Target;
use crate::stage::ArtifactCopyRule;
use crate::stage::archive::{ArchiveSpec, package_bundle};

/// One toolchain invocation and what to do with its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStage {
  /// Label used in log lines and errors, e.g. `Android-APK`.
  pub label: String,
  pub command: CommandSpec,
  /// Archive to produce after the command succeeds.
  pub package: Option<ArchiveSpec>,
  /// Copies into the release tree, applied after the command and packaging.
  pub artifacts: Vec<ArtifactCopyRule>,
}

impl BuildStage {
  fn new(label: impl Into<String>, command: CommandSpec) -> Self {
    Self {
      label: label.into(),
      command,
      package: None,
      artifacts: Vec::new(),
    }
  }

  fn package(mut self, spec: ArchiveSpec) -> Self {
    self.package = Some(spec);
    self
  }

  fn artifact(mut self, rule: ArtifactCopyRule) -> Self {
    self.artifacts.push(rule);
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTask {
  pub target: Target,
  /// Applied over the inherited environment of every command in the task.
  pub env: BTreeMap<String, String>,
  pub prepare: Option<CommandSpec>,
  pub stages: Vec<BuildStage>,
}

/// A single step of a task, in execution order.
#[derive(Debug, Clone, Copy)]
pub enum TaskStep<'a> {
  Command { label: &'a str, spec: &'a CommandSpec },
  Package(&'a ArchiveSpec),
  Copy(&'a ArtifactCopyRule),
}

fn env_overlay(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
  pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

impl BuildTask {
  /// The release recipe for `target` in the project described by `ctx`.
  pub fn for_target(target: Target, ctx: &BuildContext) -> Self {
    let flutter = |args: &[&str]| {
      CommandSpec::new(&ctx.toolchain.flutter)
        .args(args.iter().copied())
        .current_dir(&ctx.project_dir)
    };
    let release = ctx.release_path(target);
    let app = &ctx.app_name;

    match target {
      Target::Ios => {
        let ipa = ctx.project_path(format!("{app}.ipa"));
        Self {
          target,
          env: env_overlay(&[
            ("FLUTTER_XCODE_ONLY_ACTIVE_ARCH", "YES"),
            ("DISABLE_MANUAL_TARGET_ORDER_BUILD_WARNING", "1"),
            ("COMPILER_INDEX_STORE_ENABLE", "NO"),
          ]),
          prepare: Some(
            CommandSpec::new(&ctx.toolchain.pod)
              .args(["install", "--repo-update"])
              .current_dir(ctx.project_path("ios")),
          ),
          stages: vec![
            BuildStage::new("iOS", flutter(&["build", "ios", "--release", "--no-codesign"]))
              .package(ArchiveSpec {
                bundle: ctx.project_path("build/ios/iphoneos/Runner.app"),
                work_dir: ctx.project_dir.clone(),
                output: ipa.clone(),
              })
              .artifact(ArtifactCopyRule::path(ipa, release.join(format!("{app}.ipa")), "iOS")),
          ],
        }
      }
      Target::Android => {
        let apk_dir = ctx.project_path("build/app/outputs/flutter-apk");
        Self {
          target,
          env: env_overlay(&[(
            "GRADLE_OPTS",
            "-Dorg.gradle.daemon=true -Dorg.gradle.parallel=true -Dorg.gradle.configureondemand=true -Dorg.gradle.jvmargs=-Xmx4g",
          )]),
          prepare: None,
          stages: vec![
            BuildStage::new(
              "Android-APK",
              flutter(&[
                "build",
                "apk",
                "--target-platform",
                "android-arm,android-arm64",
                "--split-per-abi",
              ]),
            )
            .artifact(ArtifactCopyRule::path(
              apk_dir.join("app-armeabi-v7a-release.apk"),
              release.join(format!("{app}-arm.apk")),
              "Android-APK",
            ))
            .artifact(ArtifactCopyRule::path(
              apk_dir.join("app-arm64-v8a-release.apk"),
              release.join(format!("{app}-arm64.apk")),
              "Android-APK",
            )),
            BuildStage::new(
              "Android-AAB",
              flutter(&["build", "appbundle", "--target-platform", "android-arm,android-arm64"]),
            )
            .artifact(ArtifactCopyRule::path(
              ctx.project_path("build/app/outputs/bundle/release/app-release.aab"),
              release.join(format!("{app}.aab")),
              "Android-AAB",
            )),
          ],
        }
      }
      Target::Macos => Self {
        target,
        env: env_overlay(&[("MACOSX_DEPLOYMENT_TARGET", "10.14"), ("COMPILER_INDEX_STORE_ENABLE", "NO")]),
        prepare: None,
        stages: vec![
          BuildStage::new("macOS", flutter(&["build", "macos", "--release"])).artifact(
            ArtifactCopyRule::first_with_suffix(
              ctx.project_path("build/macos/Build/Products/Release"),
              ".app",
              release.join(format!("{app}.app")),
              "macOS",
            ),
          ),
        ],
      },
      Target::Web => Self {
        target,
        env: BTreeMap::new(),
        prepare: None,
        stages: vec![
          BuildStage::new("Web", flutter(&["build", "web", "--release", "--dart2js-optimization=O4"]))
            .artifact(ArtifactCopyRule::path(ctx.project_path("build/web"), release, "Web")),
        ],
      },
    }
  }

  /// Every step in the order it runs.
  pub fn steps(&self) -> Vec<TaskStep<'_>> {
    let mut steps = Vec::new();
    if let Some(prepare) = &self.prepare {
      steps.push(TaskStep::Command {
        label: "prepare",
        spec: prepare,
      });
    }
    for stage in &self.stages {
      steps.push(TaskStep::Command {
        label: &stage.label,
        spec: &stage.command,
      });
      if let Some(package) = &stage.package {
        steps.push(TaskStep::Package(package));
      }
      steps.extend(stage.artifacts.iter().map(TaskStep::Copy));
    }
    steps
  }

  /// Run the task to completion. Never panics on toolchain failure.
  pub fn run(&self, runner: &CommandRunner) -> BuildResult {
    let start = Instant::now();
    let mut warnings = Vec::new();
    info!(platform = %self.target, "build started");

    for step in self.steps() {
      match self.perform(step, runner) {
        Outcome::Ok => {}
        Outcome::Warning(warning) => warnings.push(warning),
        Outcome::Fatal(output) => {
          let elapsed = start.elapsed();
          error!(platform = %self.target, "build failed after {:.1}s", elapsed.as_secs_f64());
          return BuildResult::failure(self.target, elapsed, output, warnings);
        }
      }
    }

    let elapsed = start.elapsed();
    info!(platform = %self.target, warnings = warnings.len(), "build succeeded in {:.1}s", elapsed.as_secs_f64());
    BuildResult::success(self.target, elapsed, warnings)
  }

  fn perform(&self, step: TaskStep<'_>, runner: &CommandRunner) -> Outcome {
    match step {
      TaskStep::Command { label, spec } => {
        let spec = spec.clone().envs(&self.env);
        let label = format!("{}:{label}", self.target);
        match runner.run(&spec, &label) {
          Ok(_) => Outcome::Ok,
          Err(e) => Outcome::Fatal(e.diagnostics()),
        }
      }
      TaskStep::Package(spec) => match package_bundle(spec) {
        Ok(_) => Outcome::Ok,
        Err(e) => {
          error!(platform = %self.target, error = %e, "packaging failed");
          Outcome::Fatal(format!("packaging failed: {e}"))
        }
      },
      TaskStep::Copy(rule) => rule.apply(),
    }
  }
}
