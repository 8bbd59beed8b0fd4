//! Tracing setup for the server binary.
//!
//! Events go to stdout in compact form and are mirrored, without ANSI colors, to the log file
//! named by [`Config::log_file`](crate::config::Config::log_file). A log file that cannot be
//! opened only disables the file copy.
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber, writing to stdout and to `log_file`.
///
/// `RUST_LOG` overrides the default `info` filter. Only the first call installs a subscriber.
pub fn init_tracing(log_file: &Path) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = file_writer(log_file).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .compact()
    });

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();

    if let Err(err) = result {
        eprintln!("Tracing subscriber already installed: {err}");
    }
}

fn file_writer(path: &Path) -> Option<NonBlocking> {
    let file = match open_log_file(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(file);
    // A writer whose guard is dropped stops flushing, so only the first one is handed out.
    LOG_GUARD.set(guard).ok()?;
    Some(writer)
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
