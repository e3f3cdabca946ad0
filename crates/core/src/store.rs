//! Durable storage for the watch configuration
//!
//! The config lives as UTF-8 JSON in `wac.config.json` in the
//! invocation directory:
//!
//! ```json
//! {
//!   "watch": { "<destination>": ["<source>", ...] },
//!   "ignore": ["<source>", ...]
//! }
//! ```
//!
//! Loading and saving are explicit; mutations on [`Config`] never
//! touch the disk on their own. Last write wins, single-writer
//! assumption, no file locking.

use crate::config::Config;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the invocation directory.
pub const DEFAULT_CONFIG_FILE: &str = "wac.config.json";

/// Errors raised by config persistence.
///
/// Only [`ConfigError::NotFound`] is recoverable (the caller may
/// create an empty config and retry); the other variants are fatal to
/// a watch session.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config file at the given path.
    #[error("config file not found at {0}")]
    NotFound(PathBuf),

    /// The file exists but does not parse as the expected schema.
    #[error("config file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Any other read or write failure.
    #[error("config file I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Load a [`Config`] from `path`.
///
/// Paths read from disk are re-normalized so hand-edited files still
/// satisfy the equality invariants of the in-memory model.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Err(err) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    let parsed: Config = serde_json::from_str(&raw).map_err(|source| ConfigError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(renormalize(parsed))
}

/// Serialize `config` to `path` as pretty-printed JSON.
pub fn save(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let raw = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source: source.into(),
    })?;

    fs::write(path, raw).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Rebuild a parsed config through the mutation API so that
/// normalization and dedupe hold no matter what the file contained.
fn renormalize(parsed: Config) -> Config {
    let mut config = Config::default();
    for (dest, sources) in &parsed.watch {
        config.add_watch_files(sources, dest);
    }
    config.add_ignore_files(&parsed.ignore);
    config
}
