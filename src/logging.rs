//! Tracing setup for the `atlas` binary.
//!
//! The terminal UI owns stdout and stderr while it runs, so interactive
//! sessions log to a per-run file. One-shot modes print their tables on
//! stdout and log to stderr. Both honor `RUST_LOG` and default to `info`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const APP_DIR: &str = "db-atlas";
const LOG_FILE: &str = "atlas.log";

/// Logs the interactive session to [`get_log_path`].
///
/// The file is recreated on every start. If it cannot be opened the session
/// runs without logging, since writing to the terminal would garble the UI.
pub fn init_file_logging() {
    let log_path = get_log_path();
    let Some(log_file) = open_log_file(&log_path) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

/// Logs one-shot commands to stderr, keeping stdout for their output.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(std::io::stderr)
        .init();
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Warning: cannot create {}: {e}", dir.display());
            return None;
        }
    }

    File::create(path)
        .map_err(|e| eprintln!("Warning: cannot open {}: {e}", path.display()))
        .ok()
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Where the interactive session log lives.
///
/// `<state dir>/db-atlas/atlas.log` where the platform has a state directory
/// (`~/.local/state` on Linux), else under the config directory, else in
/// the temp directory.
pub fn get_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|dir| dir.join(APP_DIR).join(LOG_FILE))
        .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_absolute() {
        assert!(get_log_path().is_absolute());
    }

    #[test]
    fn test_log_path_names_the_app() {
        let path = get_log_path();
        assert!(path.ends_with(LOG_FILE));
        assert!(path.to_string_lossy().contains(APP_DIR) || path.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn test_open_log_file_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(LOG_FILE);
        assert!(open_log_file(&path).is_some());
        assert!(path.exists());
    }
}
