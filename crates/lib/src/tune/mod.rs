//! Toolchain configuration tuning.
//!
//! Idempotent edits to the native toolchains' config files plus a few warm-up
//! commands, applied per target before building. Nothing here can fail a run:
//! every step reports an [`Outcome`].

pub mod gradle;
pub mod podfile;

use tracing::{info, warn};

use crate::context::BuildContext;
use crate::execute::runner::{CommandRunner, CommandSpec};
use crate::execute::types::Outcome;
use crate::platform::Target;

/// One tuning step and how it went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuneStep {
  pub target: Target,
  pub step: String,
  pub outcome: Outcome,
}

impl TuneStep {
  fn new(target: Target, step: impl Into<String>, outcome: Outcome) -> Self {
    Self {
      target,
      step: step.into(),
      outcome,
    }
  }
}

/// Which targets to tune.
///
/// `optimize_all` selects every target; otherwise an explicit request is tuned as
/// given (in declaration order); otherwise nothing is tuned.
pub fn select_targets(optimize_all: bool, requested: Option<&[Target]>) -> Vec<Target> {
  match (optimize_all, requested) {
    (true, _) => Target::ALL.to_vec(),
    (false, Some(requested)) => Target::ALL.into_iter().filter(|t| requested.contains(t)).collect(),
    (false, None) => Vec::new(),
  }
}

/// Tune every target in `targets`.
///
/// File edits run for every target. Commands that need the target's host
/// toolchain are skipped with a warning when the host cannot build it.
pub fn tune_targets(ctx: &BuildContext, runner: &CommandRunner, targets: &[Target]) -> Vec<TuneStep> {
  let mut steps = Vec::new();

  for &target in targets {
    info!(platform = %target, "tuning build configuration");
    let host_ok = target.is_available_on(ctx.host);

    match target {
      Target::Ios => {
        steps.push(TuneStep::new(
          target,
          "Podfile",
          podfile::tune_podfile(&ctx.project_path("ios/Podfile")),
        ));
        steps.push(TuneStep::new(
          target,
          ".xcode.env",
          podfile::ensure_xcode_env(&ctx.project_path("ios/.xcode.env"), ctx.cpu_count),
        ));
        let pod_cache = CommandSpec::new(&ctx.toolchain.pod)
          .args(["cache", "clean", "--all"])
          .current_dir(ctx.project_path("ios"));
        steps.push(host_bound_command(runner, target, pod_cache, host_ok));
      }
      Target::Android => {
        steps.push(TuneStep::new(
          target,
          "gradle.properties",
          gradle::tune_gradle_properties(&ctx.project_path("android/gradle.properties")),
        ));
      }
      Target::Macos | Target::Web => {}
    }

    let precache = CommandSpec::new(&ctx.toolchain.flutter)
      .args(["precache".to_string(), format!("--{target}")])
      .current_dir(&ctx.project_dir);
    steps.push(host_bound_command(runner, target, precache, host_ok));
  }

  steps
}

fn host_bound_command(runner: &CommandRunner, target: Target, spec: CommandSpec, host_ok: bool) -> TuneStep {
  let step = spec.command_line();
  if !host_ok {
    warn!(platform = %target, command = %step, "host cannot build this platform, skipping");
    return TuneStep::new(
      target,
      step.clone(),
      Outcome::Warning(format!("skipped `{step}`: not supported on this host")),
    );
  }

  let outcome = match runner.run(&spec, &format!("{target} tune")) {
    Ok(_) => Outcome::Ok,
    Err(e) => {
      warn!(platform = %target, error = %e, "tuning command failed, continuing");
      Outcome::Warning(e.diagnostics())
    }
  };
  TuneStep::new(target, step, outcome)
}
