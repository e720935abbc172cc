//! Error types for configuration resolution and loading.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while resolving identity, locating, or loading configuration.
///
/// All variants surface during [`ConfigHolder::init`](crate::ConfigHolder::init)
/// and fail initialization as a whole; a failed scheduled reload is logged
/// instead and never produces one of these at the call site.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No package descriptor on disk and the options did not carry the
    /// required identity field.
    #[error("no package descriptor at {descriptor_path} and no {missing} in the options")]
    MissingDescriptorAndOptions {
        descriptor_path: PathBuf,
        missing: &'static str,
    },

    /// Neither an `app_config_path` option nor an `APP_CONF_PATH` override
    /// was present.
    #[error("no configuration root: provide the app_config_path option or set APP_CONF_PATH")]
    MissingConfigPath,

    /// Neither an `app_env` option nor an `APP_ENV` override was present.
    #[error("no deployment environment: provide the app_env option or set APP_ENV")]
    MissingEnv,

    /// All three tier candidates were probed and none exists.
    #[error("no suitable configuration file found under {root}")]
    NoConfigFileFound { root: PathBuf },

    /// A descriptor or configuration file could not be read.
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A descriptor or configuration file could not be parsed.
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn parse(path: &Path, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
