//! Command runner.
//!
//! Runs external toolchain commands described by a [`CommandSpec`]. Commands are
//! argument vectors rather than shell strings, and the process is started by an
//! [`Executor`] so tests can substitute a scripted fake.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::execute::types::ExecuteError;

/// Description of an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
  /// Merged over the inherited environment; entries here win on collision.
  pub env: BTreeMap<String, String>,
}

impl CommandSpec {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      env: BTreeMap::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.cwd = Some(dir.as_ref().to_path_buf());
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  /// Add every entry of `overlay`, replacing keys already set on this spec.
  pub fn envs(mut self, overlay: &BTreeMap<String, String>) -> Self {
    for (key, value) in overlay {
      self.env.insert(key.clone(), value.clone());
    }
    self
  }

  /// The argument vector joined for display, e.g. `flutter build web`.
  pub fn command_line(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.command_line())
  }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
  pub success: bool,
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl ExecOutput {
  /// Diagnostic text: stderr if there is any, stdout otherwise.
  pub fn diagnostics(&self) -> &str {
    if self.stderr.trim().is_empty() {
      &self.stdout
    } else {
      &self.stderr
    }
  }
}

/// Starts processes and waits for them.
pub trait Executor: Send + Sync {
  fn execute(&self, spec: &CommandSpec) -> std::io::Result<ExecOutput>;
}

/// Executor backed by real OS processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
  fn execute(&self, spec: &CommandSpec) -> std::io::Result<ExecOutput> {
    let mut command = Command::new(&spec.program);
    command.args(&spec.args).envs(&spec.env);
    if let Some(cwd) = &spec.cwd {
      command.current_dir(cwd);
    }

    debug!(command = %spec, cwd = ?spec.cwd, "spawning process");

    let output = command.output()?;
    Ok(ExecOutput {
      success: output.status.success(),
      code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
  }
}

/// Runs commands, timing them and logging start/finish lines.
#[derive(Clone)]
pub struct CommandRunner {
  executor: Arc<dyn Executor>,
}

impl fmt::Debug for CommandRunner {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CommandRunner").finish_non_exhaustive()
  }
}

impl Default for CommandRunner {
  fn default() -> Self {
    Self::system()
  }
}

impl CommandRunner {
  pub fn new(executor: Arc<dyn Executor>) -> Self {
    Self { executor }
  }

  /// Runner that spawns real processes.
  pub fn system() -> Self {
    Self::new(Arc::new(SystemExecutor))
  }

  /// Run `spec` to completion.
  ///
  /// Output is captured, never echoed on success. A non-zero exit becomes
  /// [`ExecuteError::CmdFailed`] carrying the captured diagnostics; this never
  /// panics so callers can keep aggregating other targets.
  pub fn run(&self, spec: &CommandSpec, label: &str) -> Result<Duration, ExecuteError> {
    let start = Instant::now();
    info!(label, command = %spec, "starting");

    let output = self.executor.execute(spec).map_err(|source| {
      error!(label, program = %spec.program, error = %source, "failed to start command");
      ExecuteError::Spawn {
        label: label.to_string(),
        program: spec.program.clone(),
        source,
      }
    })?;

    let elapsed = start.elapsed();

    if !output.success {
      error!(label, code = ?output.code, "command failed:\n{}", output.diagnostics().trim_end());
      return Err(ExecuteError::CmdFailed {
        label: label.to_string(),
        code: output.code,
        output: output.diagnostics().to_string(),
      });
    }

    if !output.stdout.trim().is_empty() {
      debug!(label, stdout = %output.stdout.trim_end(), "command output");
    }
    if !output.stderr.trim().is_empty() {
      debug!(label, stderr = %output.stderr.trim_end(), "command output");
    }
    info!(label, "finished in {:.1}s", elapsed.as_secs_f64());

    Ok(elapsed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{FakeExecutor, shell_spec};
  use tempfile::TempDir;

  #[test]
  fn spec_builder_collects_args_and_env() {
    let spec = CommandSpec::new("flutter")
      .args(["build", "web"])
      .arg("--release")
      .env("A", "1")
      .envs(&BTreeMap::from([("A".to_string(), "2".to_string()), ("B".to_string(), "3".to_string())]));

    assert_eq!(spec.command_line(), "flutter build web --release");
    assert_eq!(spec.env.get("A").map(String::as_str), Some("2"));
    assert_eq!(spec.env.len(), 2);
  }

  #[test]
  fn successful_command_returns_elapsed() {
    let runner = CommandRunner::system();
    let elapsed = runner.run(&shell_spec("exit 0"), "test").unwrap();
    assert!(elapsed < Duration::from_secs(30));
  }

  #[test]
  #[cfg(unix)]
  fn failing_command_surfaces_stderr() {
    let runner = CommandRunner::system();
    let err = runner.run(&shell_spec("echo oops >&2; exit 3"), "test").unwrap_err();

    match err {
      ExecuteError::CmdFailed { label, code, output } => {
        assert_eq!(label, "test");
        assert_eq!(code, Some(3));
        assert_eq!(output.trim(), "oops");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  #[cfg(unix)]
  fn failing_command_falls_back_to_stdout() {
    let runner = CommandRunner::system();
    let err = runner.run(&shell_spec("echo from-stdout; exit 1"), "test").unwrap_err();
    assert!(err.diagnostics().contains("from-stdout"));
  }

  #[test]
  fn missing_binary_is_spawn_error() {
    let runner = CommandRunner::system();
    let err = runner
      .run(&CommandSpec::new("shipyard-definitely-not-a-real-binary"), "test")
      .unwrap_err();
    assert!(matches!(err, ExecuteError::Spawn { .. }));
  }

  #[test]
  #[cfg(unix)]
  fn overlay_wins_over_inherited_env() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("value");
    let spec = shell_spec(&format!("printf %s \"$HOME\" > '{}'", marker.display())).env("HOME", "/overlay-home");

    CommandRunner::system().run(&spec, "env").unwrap();

    assert_eq!(std::fs::read_to_string(marker).unwrap(), "/overlay-home");
    assert_ne!(std::env::var("HOME").ok().as_deref(), Some("/overlay-home"));
  }

  #[test]
  #[cfg(unix)]
  fn runs_in_requested_directory() {
    let temp = TempDir::new().unwrap();
    let spec = CommandSpec::new("/usr/bin/touch").arg("cwd_marker").current_dir(temp.path());

    CommandRunner::system().run(&spec, "cwd").unwrap();

    assert!(temp.path().join("cwd_marker").exists());
  }

  #[test]
  fn fake_executor_records_calls() {
    let fake = Arc::new(FakeExecutor::new().fail_when("build apk", "gradle exploded"));
    let runner = CommandRunner::new(fake.clone());

    assert!(runner.run(&CommandSpec::new("flutter").args(["pub", "get"]), "deps").is_ok());
    let err = runner
      .run(&CommandSpec::new("flutter").args(["build", "apk"]), "apk")
      .unwrap_err();

    assert!(err.diagnostics().contains("gradle exploded"));
    assert_eq!(fake.calls(), vec!["flutter pub get", "flutter build apk"]);
  }
}
