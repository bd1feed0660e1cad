/// The common module is our grab bag of small shared helpers: the crate version, list utilities
/// and logging setup.
use crate::config::{LogOutput, LoggingConfig};
use crate::error::{MetaError, Result};
use directories::ProjectDirs;
use std::collections::HashSet;
use std::fs;
use std::hash::Hash;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, EnvFilter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Removes duplicates, keeping the first occurrence of each element.
pub fn uniq<T: Clone + Eq + Hash>(xs: Vec<T>) -> Vec<T> {
    let mut rv = Vec::new();
    let mut seen = HashSet::new();
    for x in xs {
        if seen.insert(x.clone()) {
            rv.push(x);
        }
    }
    rv
}

// Holds the file writer's guard for the life of the process. Dropping it stops the background
// flush thread.
static LOGGING: OnceLock<Option<WorkerGuard>> = OnceLock::new();

/// Installs the global tracing subscriber. Only the first call has any effect. `RUST_LOG` overrides
/// the configured level.
pub fn initialize_logging(config: &LoggingConfig) -> Result<()> {
    if LOGGING.get().is_some() {
        return Ok(());
    }
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let guard = match config.output {
        LogOutput::Stderr => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber).map_err(|e| MetaError::Generic(e.to_string()))?;
            None
        }
        LogOutput::File => {
            let proj_dirs = ProjectDirs::from("", "", "amarok-meta")
                .ok_or_else(|| MetaError::Generic("Failed to get project directories".to_string()))?;
            let log_dir = if cfg!(target_os = "macos") {
                proj_dirs.cache_dir()
            } else {
                proj_dirs.state_dir().unwrap_or(proj_dirs.cache_dir())
            };
            fs::create_dir_all(log_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .max_log_files(10)
                .filename_prefix("amarok-meta")
                .filename_suffix("log")
                .build(log_dir)
                .map_err(|e| MetaError::Generic(e.to_string()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber).map_err(|e| MetaError::Generic(e.to_string()))?;
            Some(guard)
        }
    };
    let _ = LOGGING.set(guard);
    Ok(())
}
