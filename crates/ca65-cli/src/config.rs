//! `ca65.toml` project configuration.

use std::io;
use std::path::{Path, PathBuf};

use ca65_syntax::FormatConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// File name searched for in the working directory and its ancestors.
pub const CONFIG_FILE: &str = "ca65.toml";

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML or has unknown keys.
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The `[format]` table.
    pub format: FormatConfig,
}

impl Config {
    /// Load the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find the nearest `ca65.toml` in `start` or one of its ancestors.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load `explicit` if given, otherwise the discovered file, otherwise
    /// the defaults.
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::discover(cwd) {
                Some(path) => path,
                None => {
                    debug!("no {CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        debug!(path = %path.display(), "loading config");
        Self::load(&path)
    }
}
