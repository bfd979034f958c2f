//! Logging setup
//!
//! Two layers:
//! - console (stderr): INFO and above, bare messages so logged commands can be
//!   copy-pasted; errors carry a level prefix. `RUST_LOG` overrides the level.
//! - log file (append): DEBUG and above with a timestamp and level.
//!
//! The subscriber is returned to the caller, which installs it for the
//! duration of the run with `tracing::subscriber::with_default`.

use crate::core::error::{ReleaseResult, ResultExt};
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Console format: message only, `ERROR    ` prefix for errors
pub struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
  S: Subscriber + for<'a> LookupSpan<'a>,
  N: for<'a> FormatFields<'a> + 'static,
{
  fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
    let level = *event.metadata().level();
    if level == Level::ERROR {
      write!(writer, "{:<8} ", level.as_str())?;
    }
    ctx.field_format().format_fields(writer.by_ref(), event)?;
    writeln!(writer)
  }
}

/// File format: `2024-05-02 14:03:11,204 INFO     message`
pub struct FileFormat;

impl<S, N> FormatEvent<S, N> for FileFormat
where
  S: Subscriber + for<'a> LookupSpan<'a>,
  N: for<'a> FormatFields<'a> + 'static,
{
  fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
    write!(writer, "{} {:<8} ", now, event.metadata().level().as_str())?;
    ctx.field_format().format_fields(writer.by_ref(), event)?;
    writeln!(writer)
  }
}

/// Build the console + file subscriber. The log file is opened in append mode.
pub fn build_subscriber(log_file: &Path) -> ReleaseResult<impl Subscriber + Send + Sync + 'static> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(log_file)
    .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

  let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  let console = tracing_subscriber::fmt::layer()
    .event_format(ConsoleFormat)
    .with_writer(std::io::stderr)
    .with_filter(console_filter);

  let file = tracing_subscriber::fmt::layer()
    .event_format(FileFormat)
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .with_filter(LevelFilter::DEBUG);

  Ok(tracing_subscriber::registry().with(console).with(file))
}
