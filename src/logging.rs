use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialise logging. The default level is `info`; with `debug` enabled it
/// becomes `debug` and `RUST_LOG` may override it.
///
/// When `log_file` is given, output is mirrored into that file through a
/// non-blocking writer. Repeated calls leave the first subscriber in place.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // Without debug we pin `info` so a stray RUST_LOG in the user's
    // environment cannot make the UI noisy.
    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let mut file_error = None;
    let file_layer = log_file.and_then(|path| match file_writer(&path) {
        Ok((writer, guard)) => {
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().with_ansi(false).with_writer(writer))
        }
        Err(e) => {
            file_error = Some(format!("{}: {e}", path.display()));
            None
        }
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init();

    if let Some(err) = file_error {
        tracing::warn!("log file disabled: {}", err);
    }
}

fn file_writer(
    path: &std::path::Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log path has no file name"))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy().into_owned())
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}
