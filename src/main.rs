mod commands;
mod core;
mod release;
mod ui;

use clap::Parser;
use core::config::Mode;
use core::context::{ReleaseContext, Settings};
use core::error::{EXIT_FAILURE, ReleaseResult, ResultExt, report_error};
use core::exec::SystemRunner;
use release::Step;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Manage Debian package releases of code and packaging repositories
#[derive(Parser)]
#[command(name = "deb-release")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Project to operate on (every configured project when omitted)
  #[arg(long, value_name = "PROJECT")]
  project: Option<String>,

  /// Release step to run
  #[arg(long, value_enum)]
  step: Step,

  /// Launchpad user id
  #[arg(short, long, value_name = "USER")]
  user: Option<String>,

  /// Target repositories owner
  #[arg(long, default_value = "checkbox-dev")]
  target_user: String,

  /// Launchpad credentials file for the helper scripts
  #[arg(long, value_name = "CRED", env = "LP_CREDS")]
  credentials: Option<String>,

  /// Release settings (JSON)
  #[arg(long, value_name = "CONFIG")]
  config: PathBuf,

  /// New release candidate (testing) or final version (stable); defaults to the config `mode`
  #[arg(long, value_enum, value_name = "MODE", env = "DEB_RELEASE_MODE")]
  mode: Option<Mode>,

  /// Do not change anything on the hosting service
  #[arg(short, long, env = "DEB_RELEASE_DRY_RUN", value_parser = clap::builder::FalseyValueParser::new())]
  dry_run: bool,

  /// Debug log, appended to on every run
  #[arg(long, value_name = "PATH", default_value = "release.log")]
  log_file: PathBuf,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let subscriber = match core::logging::build_subscriber(&cli.log_file) {
    Ok(subscriber) => subscriber,
    Err(e) => {
      eprintln!("Error: {}", e);
      std::process::exit(EXIT_FAILURE);
    }
  };

  let code = tracing::subscriber::with_default(subscriber, || match run(cli) {
    Ok(()) => 0,
    Err(err) => {
      report_error(&err);
      err.exit_code()
    }
  });

  std::process::exit(code);
}

fn run(cli: Cli) -> ReleaseResult<()> {
  let root = std::env::current_dir().context("Failed to get current directory")?;
  debug!(
    "step={} project={} config={}",
    cli.step,
    cli.project.as_deref().unwrap_or("<all>"),
    cli.config.display()
  );

  let settings = Settings {
    config_path: cli.config,
    mode: cli.mode,
    dry_run: cli.dry_run,
    user: cli.user,
    target_user: cli.target_user,
    credentials: cli.credentials,
  };

  // Built once, shared by every handler
  let ctx = ReleaseContext::build(&root, settings, Arc::new(SystemRunner))?;
  commands::run_step(&ctx, cli.step, cli.project.as_deref())
}
