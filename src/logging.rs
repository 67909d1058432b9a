/// File logging for digest runs.
///
/// Logs are stored under `{data_root}/logs/`. Each run appends to the same
/// file, starting with a separator line.
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "recap.log";
const DEFAULT_FILTER: &str = "info,reqwest=warn";

/// Path of the log file for `data_root`.
pub fn log_file_path(data_root: &Path) -> PathBuf {
    data_root.join(LOG_DIR).join(LOG_FILE)
}

/// Initializes logging to `{data_root}/logs/recap.log`.
///
/// `RUST_LOG` overrides the default filter. Calling this twice in one process
/// keeps the first subscriber.
///
/// # Arguments
///
/// * `data_root` - Directory holding settings and logs
/// * `command` - Subcommand name written into the run separator
pub fn init_logging(data_root: &Path, command: &str) -> Result<()> {
    let log_dir = data_root.join(LOG_DIR);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    // Separator goes in before the appender opens the file
    let separator = format!(
        "\n{sep}\n[{ts}] slack-recap {command}\n{sep}\n",
        sep = "=".repeat(80),
        ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        command = command
    );

    use std::io::Write;
    if let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE))
    {
        let _ = writeln!(file, "{}", separator);
    }

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok(); // Ignore error if already initialized

    tracing::info!("Logging initialized for {}", command);

    Ok(())
}
