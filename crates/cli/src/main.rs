mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use shipyard_lib::consts::{
  DEFAULT_ARTIFACT_NAME, DEFAULT_FLUTTER_BIN, DEFAULT_POD_BIN, FLUTTER_BIN_ENV, POD_BIN_ENV, RELEASE_DIR_ENV,
};
use shipyard_lib::context::{BuildContext, Toolchain};
use shipyard_lib::platform::Target;

use crate::output::{OutputFormat, print_error};

/// shipyard - multi-platform release builds for Flutter projects
#[derive(Parser)]
#[command(name = "shipyard")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(flatten)]
  project: ProjectArgs,

  #[command(subcommand)]
  command: Commands,
}

/// Where the project lives and which tools to drive.
#[derive(Debug, Args)]
pub struct ProjectArgs {
  /// Flutter project directory
  #[arg(long, global = true, default_value = ".")]
  pub project_dir: PathBuf,

  /// Release directory (default: <project-dir>/release)
  #[arg(long, global = true, env = RELEASE_DIR_ENV)]
  pub release_dir: Option<PathBuf>,

  /// Base name for release artifacts
  #[arg(long, global = true, default_value = DEFAULT_ARTIFACT_NAME)]
  pub app_name: String,

  /// Flutter executable
  #[arg(long, global = true, env = FLUTTER_BIN_ENV, default_value = DEFAULT_FLUTTER_BIN)]
  pub flutter: String,

  /// CocoaPods executable
  #[arg(long, global = true, env = POD_BIN_ENV, default_value = DEFAULT_POD_BIN)]
  pub pod: String,
}

impl ProjectArgs {
  pub fn context(&self) -> Result<BuildContext> {
    let project_dir = dunce::canonicalize(&self.project_dir)
      .with_context(|| format!("Project directory not found: {}", self.project_dir.display()))?;

    let mut ctx = BuildContext::detect(&project_dir)
      .with_app_name(&self.app_name)
      .with_toolchain(Toolchain {
        flutter: self.flutter.clone(),
        pod: self.pod.clone(),
      });
    if let Some(release_dir) = &self.release_dir {
      ctx = ctx.with_release_dir(release_dir);
    }
    debug!(project = %ctx.project_dir.display(), release = %ctx.release_dir.display(), "resolved project");
    Ok(ctx)
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Build release artifacts for one or more platforms
  Build(BuildArgs),

  /// Tune toolchain configuration files without building
  Optimize {
    /// Platforms to tune (default: all)
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    platforms: Option<Vec<Target>>,
  },

  /// Clean the project
  Clean {
    /// Only remove transient per-platform build directories
    #[arg(long)]
    temp: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Show host, toolchain and project information
  Info {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Build platforms concurrently
  #[arg(short, long)]
  pub parallel: bool,

  /// Platforms to build (default: all available on this host)
  #[arg(long, num_args = 1.., value_delimiter = ',')]
  pub platforms: Option<Vec<Target>>,

  /// Clean the project before building
  #[arg(short, long)]
  pub clean: bool,

  /// Tune toolchain configuration for every platform before building
  #[arg(short, long)]
  pub optimize: bool,

  /// Remove transient build directories after a successful build
  #[arg(short = 't', long)]
  pub clean_temp: bool,

  /// Output format
  #[arg(long, value_enum, default_value_t)]
  pub output: OutputFormat,
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Build(args) => cmd::cmd_build(&cli.project, &args),
    Commands::Optimize { platforms } => cmd::cmd_optimize(&cli.project, platforms.as_deref()),
    Commands::Clean { temp, output } => cmd::cmd_clean(&cli.project, temp, output),
    Commands::Info { output } => cmd::cmd_info(&cli.project, output),
  };

  match result {
    Ok(code) => code,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
