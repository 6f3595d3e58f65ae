//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, human-readable byte/duration formatting, and Unicode symbols.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use shipyard_lib::execute::{BuildResult, RunSummary};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// Failure output lines shown per failed target; the full text is in the log.
const FAILURE_EXCERPT_LINES: usize = 10;

pub fn format_bytes(bytes: u64) -> String {
  const KB: u64 = 1024;
  const MB: u64 = KB * 1024;
  const GB: u64 = MB * 1024;

  if bytes >= GB {
    format!("{:.1} GB", bytes as f64 / GB as f64)
  } else if bytes >= MB {
    format!("{:.1} MB", bytes as f64 / MB as f64)
  } else if bytes >= KB {
    format!("{:.1} KB", bytes as f64 / KB as f64)
  } else {
    format!("{} B", bytes)
  }
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Per-target status lines followed by warnings and failure excerpts.
pub fn print_run_summary(summary: &RunSummary, release_dir: &Path) {
  println!();
  for result in &summary.results {
    print_result_line(result);
  }

  for warning in &summary.warnings {
    print_warning(warning);
  }
  for result in &summary.results {
    for warning in &result.warnings {
      print_warning(&format!("{}: {}", result.target, warning));
    }
  }

  for result in summary.failed() {
    eprintln!();
    print_error(&format!("{} failed:", result.target));
    for line in result.output.lines().take(FAILURE_EXCERPT_LINES) {
      eprintln!("    {line}");
    }
  }

  println!();
  print_stat("Mode", &format!("{} ({} worker(s))", summary.mode, summary.workers));
  if let Some(purged) = &summary.purged {
    print_stat("Temporary files freed", &format_bytes(purged.bytes_freed));
  }
  print_stat(
    "Release",
    &format!("{} {}", symbols::ARROW, release_dir.display()),
  );
}

fn print_result_line(result: &BuildResult) {
  let elapsed = format_duration(result.elapsed);
  if result.success {
    println!(
      "{} {:<8} {}",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      result.target.as_str(),
      elapsed.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  } else {
    println!(
      "{} {:<8} {}",
      symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
      result.target.as_str(),
      elapsed.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }
}
