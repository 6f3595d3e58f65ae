//! Implementation of the `shipyard optimize` command.

use std::process::ExitCode;

use anyhow::Result;

use shipyard_lib::execute::CommandRunner;
use shipyard_lib::platform::Target;
use shipyard_lib::tune::{select_targets, tune_targets};

use crate::ProjectArgs;
use crate::output::{print_success, print_warning};

/// Tune the requested platforms, or all of them. Warnings never fail the command.
pub fn cmd_optimize(project: &ProjectArgs, platforms: Option<&[Target]>) -> Result<ExitCode> {
  let ctx = project.context()?;
  let runner = CommandRunner::system();

  let targets = select_targets(platforms.is_none(), platforms);
  let steps = tune_targets(&ctx, &runner, &targets);

  for step in &steps {
    if let Some(warning) = step.outcome.warning() {
      print_warning(&format!("{} {}: {warning}", step.target, step.step));
    }
  }

  let tuned: Vec<&str> = targets.iter().map(Target::as_str).collect();
  print_success(&format!("Tuned {}", tuned.join(", ")));
  Ok(ExitCode::SUCCESS)
}
