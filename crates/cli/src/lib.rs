use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use interfacer_core::scanner::RECORD_TARGET;
use tracing_subscriber::EnvFilter;

pub mod commands;

/// Environment variable holding a `tracing` filter, e.g. `INTERFACER_LOG=debug`.
pub const LOG_ENV: &str = "INTERFACER_LOG";

/// Canonicalize a path argument if possible, falling back to the given string
/// relative to the current working directory.
pub fn canonicalize_or_current(root: &str) -> Result<PathBuf> {
    let path = Path::new(root);
    if path == Path::new(".") {
        Ok(env::current_dir().context("Failed to get current directory")?)
    } else {
        match path.canonicalize() {
            Ok(p) => Ok(p),
            Err(_) => {
                let cwd = env::current_dir().context("Failed to get current directory")?;
                Ok(cwd.join(path))
            }
        }
    }
}

/// Install the stderr log subscriber.
///
/// `INTERFACER_LOG` wins when set; otherwise the level is `debug` when `debug`
/// is true and `warn` otherwise, with the scan record let through at `info`
/// when `record` is set. Repeated calls are ignored.
pub fn init_logging(debug: bool, record: bool) {
    let default = match (debug, record) {
        (true, _) => "debug".to_string(),
        (false, true) => format!("warn,{RECORD_TARGET}=info"),
        (false, false) => "warn".to_string(),
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
}
