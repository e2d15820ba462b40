//! Console and run-log output
//!
//! Console: stderr, filtered by `RUST_LOG` (default `info`).
//! Run log: one file per invocation, `[YYYY-MM-DD HH:MM:SS] [Level] message`.

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Line format of the run log
pub struct RunLogFormat;

impl<S, N> FormatEvent<S, N> for RunLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "[{}] [{}] ",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level_label(event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub fn level_label(level: &Level) -> &'static str {
    if *level == Level::ERROR {
        "Error"
    } else if *level == Level::WARN {
        "Warning"
    } else if *level == Level::INFO {
        "Info"
    } else if *level == Level::DEBUG {
        "Debug"
    } else {
        "Trace"
    }
}

/// `<log_dir>/appgw-<label>-<YYYYMMDD-HHMMSS>.log`
pub fn log_file_path(log_dir: &Path, label: &str) -> PathBuf {
    log_dir.join(format!(
        "appgw-{}-{}.log",
        label,
        Local::now().format("%Y%m%d-%H%M%S")
    ))
}

fn open_log_file(log_dir: &Path, label: &str) -> std::io::Result<(File, PathBuf)> {
    fs::create_dir_all(log_dir)?;
    let path = log_file_path(log_dir, label);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Install the global subscriber; returns the run-log path when file logging is active
pub fn init(log_dir: &Path, label: &str) -> Option<PathBuf> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let (file_layer, path, open_error) = match open_log_file(log_dir, label) {
        Ok((file, path)) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .event_format(RunLogFormat)
                    .with_filter(LevelFilter::DEBUG),
            ),
            Some(path),
            None,
        ),
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    if let Some(e) = open_error {
        tracing::warn!(
            "Could not open a run log in {}: {}; logging to console only",
            log_dir.display(),
            e
        );
    }
    if let Some(path) = &path {
        tracing::debug!("Run log: {}", path.display());
    }

    path
}
