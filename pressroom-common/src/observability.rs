//! Logging setup shared by the `pressroom` binary and integration tests.
//!
//! Every run writes to a daily rolling file under the resolved log
//! directory, optionally mirrored to stderr. [`init_logging`] installs the
//! global subscriber once; later calls return the same file path.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Overrides the log directory when none is configured.
pub const LOG_DIR_ENV: &str = "PRESSROOM_LOG_DIR";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Anything other than `json` (any case) is text.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used for the log file name and the fallback directory.
    pub app_name: &'static str,
    /// Explicit log directory; beats `PRESSROOM_LOG_DIR` and the
    /// `~/.local/share/<app_name>` fallback.
    pub log_dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "pressroom",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

/// Install the global `tracing` subscriber and return today's log file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let file_prefix = format!("{}.log", config.app_name);
    let today = Local::now().format("%Y-%m-%d");
    let log_path = dir.join(format!("{file_prefix}.{today}"));

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &file_prefix));
    let _ = LOG_GUARD.set(guard);

    let mut sinks = vec![sink(config.format, writer, false)];
    if config.emit_stderr {
        sinks.push(sink(config.format, std::io::stderr, true));
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter.as_str()));

    tracing_subscriber::registry()
        .with(sinks)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_PATH.set(log_path.clone());
    Ok(log_path)
}

fn sink<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let configured = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from));

    match (configured, home) {
        (Some(dir), Some(home)) => match dir.strip_prefix("~") {
            Ok(rest) => home.join(rest),
            Err(_) => dir,
        },
        (Some(dir), None) => dir,
        (None, Some(home)) => home.join(".local").join("share").join(app_name),
        (None, None) => PathBuf::from(".").join(app_name),
    }
}
