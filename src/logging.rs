//! File-backed tracing setup.
//!
//! A full-screen terminal app owns stdout, so log output goes to a daily
//! rolling file instead. The filter is read from `EMBER_LOG` and falls back to
//! the caller's default.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "EMBER_LOG";

/// File name prefix of the rolling log.
pub const LOG_FILE: &str = "ember-tui.log";

/// Keeps the background log writer alive. Drop it last.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Install the global subscriber writing to `dir`.
///
/// Returns `None` when the directory cannot be created or a subscriber is
/// already installed (for example by a test harness).
pub fn init_file_logging(dir: impl Into<PathBuf>, default_filter: &str) -> Option<LoggingGuard> {
    let log_dir = dir.into();
    std::fs::create_dir_all(&log_dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
    })
}

/// Default log directory: `$TMPDIR/ember-tui/logs`.
pub fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join("ember-tui").join("logs")
}
