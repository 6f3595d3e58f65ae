//! Test utilities for shipyard-lib.
//!
//! Provides a scripted [`Executor`] so build tasks and the scheduler can be
//! exercised without a Flutter toolchain, plus cross-platform shell helpers for
//! the few tests that spawn real processes.

use std::path::Path;
use std::sync::Mutex;

use crate::execute::runner::{CommandSpec, ExecOutput, Executor};

type Hook = Box<dyn Fn(&CommandSpec) + Send + Sync>;

enum Reaction {
  Fail(String),
  Panic,
  Run(Hook),
}

struct Rule {
  needle: String,
  reaction: Reaction,
}

/// Executor that matches command lines against substring rules.
///
/// Commands without a matching rule succeed with empty output. Every call is
/// recorded in order.
#[derive(Default)]
pub struct FakeExecutor {
  rules: Vec<Rule>,
  calls: Mutex<Vec<CommandSpec>>,
}

impl FakeExecutor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Commands containing `needle` exit with status 1 and `stderr`.
  pub fn fail_when(mut self, needle: &str, stderr: &str) -> Self {
    self.rules.push(Rule {
      needle: needle.to_string(),
      reaction: Reaction::Fail(stderr.to_string()),
    });
    self
  }

  /// Commands containing `needle` panic inside the executor.
  pub fn panic_when(mut self, needle: &str) -> Self {
    self.rules.push(Rule {
      needle: needle.to_string(),
      reaction: Reaction::Panic,
    });
    self
  }

  /// Commands containing `needle` run `hook` and then succeed.
  pub fn on(mut self, needle: &str, hook: impl Fn(&CommandSpec) + Send + Sync + 'static) -> Self {
    self.rules.push(Rule {
      needle: needle.to_string(),
      reaction: Reaction::Run(Box::new(hook)),
    });
    self
  }

  /// Command lines seen so far, in call order.
  pub fn calls(&self) -> Vec<String> {
    self.specs().iter().map(CommandSpec::command_line).collect()
  }

  pub fn specs(&self) -> Vec<CommandSpec> {
    self.calls.lock().map(|c| c.clone()).unwrap_or_default()
  }
}

impl Executor for FakeExecutor {
  fn execute(&self, spec: &CommandSpec) -> std::io::Result<ExecOutput> {
    if let Ok(mut calls) = self.calls.lock() {
      calls.push(spec.clone());
    }

    let line = spec.command_line();
    for rule in self.rules.iter().filter(|r| line.contains(&r.needle)) {
      match &rule.reaction {
        Reaction::Fail(stderr) => {
          return Ok(ExecOutput {
            success: false,
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.clone(),
          });
        }
        Reaction::Panic => panic!("fake executor asked to panic on `{line}`"),
        Reaction::Run(hook) => hook(spec),
      }
    }

    Ok(ExecOutput {
      success: true,
      code: Some(0),
      ..ExecOutput::default()
    })
  }
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}

/// A command spec that runs `script` through the platform shell.
#[cfg(unix)]
pub fn shell_spec(script: &str) -> CommandSpec {
  CommandSpec::new("/bin/sh").args(["-c", script])
}

#[cfg(windows)]
pub fn shell_spec(script: &str) -> CommandSpec {
  CommandSpec::new("cmd.exe").args(["/C", script])
}
