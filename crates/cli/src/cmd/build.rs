//! Implementation of the `shipyard build` command.
//!
//! Optionally cleans and tunes the project, then builds the selected platforms
//! and stages their artifacts into the release directory.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use shipyard_lib::clean::{CleanStats, clean_project};
use shipyard_lib::execute::{self, CommandRunner, ExecuteConfig, ExecutionMode, RunOutcome, RunSummary};
use shipyard_lib::tune::{select_targets, tune_targets};

use crate::BuildArgs;
use crate::ProjectArgs;
use crate::output::{print_info, print_json, print_run_summary, print_success, print_warning};

#[derive(Serialize)]
struct BuildReport<'a> {
  status: &'static str,
  release_dir: &'a Path,
  #[serde(skip_serializing_if = "Option::is_none")]
  cleaned: Option<&'a CleanStats>,
  tuning_warnings: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  summary: Option<&'a RunSummary>,
}

/// Execute the build command.
///
/// `--clean` alone (no platforms, no `--optimize`) only cleans. Exits non-zero
/// if any platform failed; an empty platform selection is not a failure.
pub fn cmd_build(project: &ProjectArgs, args: &BuildArgs) -> Result<ExitCode> {
  let ctx = project.context()?;
  let runner = Arc::new(CommandRunner::system());
  let json = args.output.is_json();

  let cleaned = if args.clean {
    let stats = clean_project(&ctx, &runner);
    if !json {
      report_clean(&stats);
    }
    Some(stats)
  } else {
    None
  };

  if args.clean && args.platforms.is_none() && !args.optimize {
    if json {
      print_json(&BuildReport {
        status: "cleaned",
        release_dir: &ctx.release_dir,
        cleaned: cleaned.as_ref(),
        tuning_warnings: Vec::new(),
        summary: None,
      })?;
    } else {
      print_info("Nothing to build");
    }
    return Ok(ExitCode::SUCCESS);
  }

  let tune = select_targets(args.optimize, args.platforms.as_deref());
  let tuning_warnings: Vec<String> = tune_targets(&ctx, &runner, &tune)
    .into_iter()
    .filter_map(|step| step.outcome.warning().map(|w| format!("{} {}: {w}", step.target, step.step)))
    .collect();
  if !json {
    for warning in &tuning_warnings {
      print_warning(warning);
    }
  }

  let config = ExecuteConfig {
    mode: if args.parallel {
      ExecutionMode::Parallel
    } else {
      ExecutionMode::Sequential
    },
    targets: args.platforms.clone(),
    purge_temp: args.clean_temp,
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let outcome = rt
    .block_on(execute::run(&ctx, runner, &config))
    .context("Build failed")?;

  let success = outcome.is_success();
  let summary = match &outcome {
    RunOutcome::NothingToDo => None,
    RunOutcome::Completed(summary) => Some(summary),
  };

  if json {
    print_json(&BuildReport {
      status: match (&outcome, success) {
        (RunOutcome::NothingToDo, _) => "nothing_to_do",
        (_, true) => "success",
        (_, false) => "failed",
      },
      release_dir: &ctx.release_dir,
      cleaned: cleaned.as_ref(),
      tuning_warnings,
      summary,
    })?;
  } else {
    match summary {
      None => print_info("No platforms to build on this host"),
      Some(summary) => {
        print_run_summary(summary, &ctx.release_dir);
        println!();
        if success {
          print_success("All builds completed successfully!");
        }
      }
    }
  }

  Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

pub(super) fn report_clean(stats: &CleanStats) {
  if let Some(warning) = &stats.toolchain_warning {
    print_warning(&format!("flutter clean failed: {}", warning.lines().next().unwrap_or_default()));
  }
  for failure in &stats.failed {
    print_warning(&format!("could not remove {}: {}", failure.path.display(), failure.error));
  }
  print_success(&format!("Project cleaned ({} path(s) removed)", stats.removed.len()));
  print_info("Run `flutter pub get` to restore dependencies");
}
