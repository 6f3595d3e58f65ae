//! Types for build execution.
//!
//! This module defines the error types, step outcomes, per-target results and
//! run configuration used by the runner, the build tasks and the scheduler.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::clean::CleanStats;
use crate::platform::Target;

/// Errors that can occur during build execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The process could not be started at all (missing binary, bad cwd, ...).
  #[error("[{label}] failed to start {program}: {source}")]
  Spawn {
    label: String,
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The process ran and exited unsuccessfully.
  #[error("[{label}] command failed with exit code {code:?}")]
  CmdFailed {
    label: String,
    code: Option<i32>,
    /// Captured diagnostic output (stderr, or stdout when stderr is empty).
    output: String,
  },

  /// The release directory could not be created.
  #[error("failed to create release directory {}: {source}", path.display())]
  ReleaseDir { path: PathBuf, source: std::io::Error },
}

impl ExecuteError {
  /// Diagnostic text to surface for this failure.
  pub fn diagnostics(&self) -> String {
    match self {
      ExecuteError::CmdFailed { output, .. } if !output.trim().is_empty() => format!("{self}\n{}", output.trim_end()),
      _ => self.to_string(),
    }
  }
}

/// Result of a best-effort step.
///
/// `Warning` means the step was skipped or went wrong without affecting the run;
/// `Fatal` means the owning task must fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Ok,
  Warning(String),
  Fatal(String),
}

impl Outcome {
  pub fn is_ok(&self) -> bool {
    matches!(self, Outcome::Ok)
  }

  /// The warning text, if this is a warning.
  pub fn warning(&self) -> Option<&str> {
    match self {
      Outcome::Warning(msg) => Some(msg),
      _ => None,
    }
  }
}

/// How tasks are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
  #[default]
  Sequential,
  Parallel,
}

impl fmt::Display for ExecutionMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ExecutionMode::Sequential => write!(f, "sequential"),
      ExecutionMode::Parallel => write!(f, "parallel"),
    }
  }
}

/// Configuration for a build run.
#[derive(Debug, Clone, Default)]
pub struct ExecuteConfig {
  pub mode: ExecutionMode,
  /// Targets explicitly requested; `None` means every target.
  pub targets: Option<Vec<Target>>,
  /// Remove transient build directories after a fully successful run.
  pub purge_temp: bool,
}

/// Outcome of one target's build task. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
  pub target: Target,
  pub success: bool,
  #[serde(serialize_with = "serialize_secs")]
  pub elapsed: Duration,
  /// Captured diagnostic output of the failing step, empty on success.
  pub output: String,
  /// Non-fatal problems (missing artifacts, copy errors).
  pub warnings: Vec<String>,
}

impl BuildResult {
  pub fn success(target: Target, elapsed: Duration, warnings: Vec<String>) -> Self {
    Self {
      target,
      success: true,
      elapsed,
      output: String::new(),
      warnings,
    }
  }

  pub fn failure(target: Target, elapsed: Duration, output: impl Into<String>, warnings: Vec<String>) -> Self {
    Self {
      target,
      success: false,
      elapsed,
      output: output.into(),
      warnings,
    }
  }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
  s.serialize_f64(d.as_secs_f64())
}

/// Aggregated results of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  pub mode: ExecutionMode,
  /// Number of tasks allowed in flight at once.
  pub workers: usize,
  /// Results in completion order.
  pub results: Vec<BuildResult>,
  /// Run-level problems that did not fail any task.
  pub warnings: Vec<String>,
  /// What the transient purge removed, if it ran.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub purged: Option<CleanStats>,
}

impl RunSummary {
  pub fn new(mode: ExecutionMode, workers: usize, results: Vec<BuildResult>) -> Self {
    Self {
      mode,
      workers,
      results,
      warnings: Vec::new(),
      purged: None,
    }
  }

  /// Returns true if every task succeeded.
  pub fn is_success(&self) -> bool {
    self.results.iter().all(|r| r.success)
  }

  pub fn failed(&self) -> impl Iterator<Item = &BuildResult> {
    self.results.iter().filter(|r| !r.success)
  }

  pub fn result_for(&self, target: Target) -> Option<&BuildResult> {
    self.results.iter().find(|r| r.target == target)
  }
}

/// What a scheduler run amounted to.
#[derive(Debug, Clone)]
pub enum RunOutcome {
  /// No requested target can be built on this host.
  NothingToDo,
  Completed(RunSummary),
}

impl RunOutcome {
  /// Nothing-to-do counts as success for exit-code purposes.
  pub fn is_success(&self) -> bool {
    match self {
      RunOutcome::NothingToDo => true,
      RunOutcome::Completed(summary) => summary.is_success(),
    }
  }
}
