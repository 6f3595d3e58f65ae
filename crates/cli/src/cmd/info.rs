use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use shipyard_lib::consts::APP_NAME;
use shipyard_lib::platform::{Target, resolve_targets};

use crate::ProjectArgs;
use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Serialize)]
struct Info {
  version: &'static str,
  host: Option<&'static str>,
  cpu_count: usize,
  available_platforms: Vec<Target>,
  project_dir: String,
  release_dir: String,
  flutter: String,
  pod: String,
}

pub fn cmd_info(project: &ProjectArgs, output: OutputFormat) -> Result<ExitCode> {
  let ctx = project.context()?;
  let info = Info {
    version: env!("CARGO_PKG_VERSION"),
    host: ctx.host.map(|os| os.as_str()),
    cpu_count: ctx.cpu_count,
    available_platforms: resolve_targets(None, ctx.host),
    project_dir: ctx.project_dir.display().to_string(),
    release_dir: ctx.release_dir.display().to_string(),
    flutter: ctx.toolchain.flutter.clone(),
    pod: ctx.toolchain.pod.clone(),
  };

  if output.is_json() {
    print_json(&info)?;
    return Ok(ExitCode::SUCCESS);
  }

  println!("{APP_NAME} v{}", info.version);
  print_stat("Host", info.host.unwrap_or("unknown"));
  print_stat("CPUs", &info.cpu_count.to_string());
  let platforms: Vec<&str> = info.available_platforms.iter().map(Target::as_str).collect();
  print_stat("Platforms", &platforms.join(", "));
  print_stat("Project", &info.project_dir);
  print_stat("Release", &info.release_dir);
  print_stat("Flutter", &info.flutter);
  print_stat("CocoaPods", &info.pod);
  Ok(ExitCode::SUCCESS)
}
