//! Build execution.
//!
//! This module provides the main entry point for a release build:
//! - resolving the requested targets against the host
//! - running one [`BuildTask`] per target, sequentially or on a bounded pool
//! - aggregating per-target results into a [`RunSummary`]
//!
//! A failing or panicking task never affects the others; every submitted task is
//! reported exactly once.

pub mod runner;
pub mod task;
pub mod types;

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::clean::purge_build_files;
use crate::context::BuildContext;
use crate::platform::{Target, resolve_targets};
use crate::stage::ensure_release_dir;

pub use runner::{CommandRunner, CommandSpec, ExecOutput, Executor, SystemExecutor};
pub use task::{BuildStage, BuildTask, TaskStep};
pub use types::{BuildResult, ExecuteConfig, ExecuteError, ExecutionMode, Outcome, RunOutcome, RunSummary};

/// Number of tasks allowed in flight: one per task, capped at the CPU count.
pub fn worker_pool_size(task_count: usize, cpu_count: usize) -> usize {
  task_count.min(cpu_count).max(1)
}

/// Run a release build for the targets selected by `config`.
///
/// 1. Resolve targets; none left means [`RunOutcome::NothingToDo`]
/// 2. Create the release directory (the only hard error)
/// 3. Fetch Dart dependencies once (failure is a warning)
/// 4. Run the build tasks
/// 5. Purge transient build files if everything succeeded and it was requested
pub async fn run(
  ctx: &BuildContext,
  runner: Arc<CommandRunner>,
  config: &ExecuteConfig,
) -> Result<RunOutcome, ExecuteError> {
  let targets = resolve_targets(config.targets.as_deref(), ctx.host);
  if targets.is_empty() {
    info!("no platforms to build on this host");
    return Ok(RunOutcome::NothingToDo);
  }

  ensure_release_dir(&ctx.release_dir).map_err(|source| ExecuteError::ReleaseDir {
    path: ctx.release_dir.clone(),
    source,
  })?;

  let mut run_warnings = Vec::new();
  let pub_get = CommandSpec::new(&ctx.toolchain.flutter)
    .args(["pub", "get"])
    .current_dir(&ctx.project_dir);
  if let Err(e) = runner.run(&pub_get, "dependencies") {
    warn!(error = %e, "fetching dependencies failed, building anyway");
    run_warnings.push(e.diagnostics());
  }

  let names: Vec<&str> = targets.iter().map(Target::as_str).collect();
  info!(platforms = %names.join(", "), mode = %config.mode, "starting build");

  let tasks = targets.iter().map(|&t| BuildTask::for_target(t, ctx)).collect();
  let mut summary = execute_tasks(tasks, runner, config.mode, ctx.cpu_count).await;
  summary.warnings.extend(run_warnings);

  if summary.is_success() {
    info!(release_dir = %ctx.release_dir.display(), "all builds succeeded");
    if config.purge_temp {
      summary.purged = Some(purge_build_files(ctx));
    }
  } else {
    let failed: Vec<&str> = summary.failed().map(|r| r.target.as_str()).collect();
    error!(failed = %failed.join(", "), "some builds failed");
  }

  Ok(RunOutcome::Completed(summary))
}

/// Run `tasks` and collect one result per task.
///
/// Sequential mode preserves task order. Parallel mode admits at most
/// [`worker_pool_size`] tasks at once and records results as they complete.
pub async fn execute_tasks(
  tasks: Vec<BuildTask>,
  runner: Arc<CommandRunner>,
  mode: ExecutionMode,
  cpu_count: usize,
) -> RunSummary {
  match mode {
    ExecutionMode::Sequential => execute_sequential(tasks, runner).await,
    ExecutionMode::Parallel => execute_parallel(tasks, runner, cpu_count).await,
  }
}

async fn execute_sequential(tasks: Vec<BuildTask>, runner: Arc<CommandRunner>) -> RunSummary {
  let mut results = Vec::with_capacity(tasks.len());

  for task in tasks {
    let target = task.target;
    let runner = runner.clone();
    let start = Instant::now();

    let result = match tokio::task::spawn_blocking(move || task.run(&runner)).await {
      Ok(result) => result,
      Err(e) => panicked(target, start.elapsed(), e),
    };
    results.push(result);
  }

  RunSummary::new(ExecutionMode::Sequential, 1, results)
}

async fn execute_parallel(tasks: Vec<BuildTask>, runner: Arc<CommandRunner>, cpu_count: usize) -> RunSummary {
  let workers = worker_pool_size(tasks.len(), cpu_count);
  debug!(workers, tasks = tasks.len(), "starting worker pool");

  let semaphore = Arc::new(Semaphore::new(workers));
  let mut pending: Vec<Target> = tasks.iter().map(|t| t.target).collect();
  let mut join_set = JoinSet::new();

  for task in tasks {
    let semaphore = semaphore.clone();
    let runner = runner.clone();

    join_set.spawn(async move {
      let target = task.target;
      let Ok(_permit) = semaphore.acquire_owned().await else {
        return BuildResult::failure(target, Duration::ZERO, "worker pool closed before the task started", Vec::new());
      };

      let start = Instant::now();
      match tokio::task::spawn_blocking(move || task.run(&runner)).await {
        Ok(result) => result,
        Err(e) => panicked(target, start.elapsed(), e),
      }
    });
  }

  let mut results = Vec::with_capacity(pending.len());
  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok(result) => {
        pending.retain(|t| *t != result.target);
        results.push(result);
      }
      Err(e) => error!(error = %e, "build task aborted"),
    }
  }

  // A task lost to an abort above still gets a result.
  for target in pending {
    results.push(BuildResult::failure(
      target,
      Duration::ZERO,
      "build task did not report a result",
      Vec::new(),
    ));
  }

  RunSummary::new(ExecutionMode::Parallel, workers, results)
}

fn panicked(target: Target, elapsed: Duration, err: JoinError) -> BuildResult {
  let reason = match err.try_into_panic() {
    Ok(payload) => panic_message(payload.as_ref()),
    Err(err) => err.to_string(),
  };
  error!(platform = %target, "build task panicked: {reason}");
  BuildResult::failure(target, elapsed, format!("build task panicked: {reason}"), Vec::new())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_string()
  }
}
