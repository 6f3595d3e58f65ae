//! Implementation of the `shipyard clean` command.

use std::process::ExitCode;

use anyhow::Result;

use shipyard_lib::clean::{clean_project, purge_build_files};
use shipyard_lib::execute::CommandRunner;

use crate::ProjectArgs;
use crate::cmd::build::report_clean;
use crate::output::{OutputFormat, format_bytes, print_json, print_stat, print_success, print_warning};

pub fn cmd_clean(project: &ProjectArgs, temp_only: bool, output: OutputFormat) -> Result<ExitCode> {
  let ctx = project.context()?;

  if !temp_only {
    let stats = clean_project(&ctx, &CommandRunner::system());
    if output.is_json() {
      print_json(&stats)?;
    } else {
      report_clean(&stats);
    }
    return Ok(ExitCode::SUCCESS);
  }

  let stats = purge_build_files(&ctx);
  if output.is_json() {
    print_json(&stats)?;
  } else {
    for failure in &stats.failed {
      print_warning(&format!("could not remove {}: {}", failure.path.display(), failure.error));
    }
    print_success("Temporary build files removed");
    print_stat("Paths removed", &stats.removed.len().to_string());
    print_stat("Space freed", &format_bytes(stats.bytes_freed));
  }
  Ok(ExitCode::SUCCESS)
}
