//! Runtime configuration from `CARDSHELF_*` environment variables.
//!
//! # Responsibility
//! - Resolve database path, logging settings and the default folder delete
//!   mode in one place.
//!
//! # Invariants
//! - Resolution is a pure function of the lookup it is given.
//! - Blank values count as unset.

use crate::logging::{default_log_level, normalize_level};
use crate::service::FolderDeleteMode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "CARDSHELF_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "CARDSHELF_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "CARDSHELF_LOG_DIR";
pub const FOLDER_DELETE_MODE_ENV: &str = "CARDSHELF_FOLDER_DELETE_MODE";

const DEFAULT_DB_FILE_NAME: &str = "cardshelf.sqlite3";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} `{}`; expected {}",
            self.key, self.value, self.expected
        )
    }
}

impl Error for ConfigError {}

/// Resolved engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub folder_delete_mode: FolderDeleteMode,
}

impl CoreConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to its
    /// raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_level = match read(LOG_LEVEL_ENV) {
            Some(raw) => normalize_level(&raw)
                .map_err(|_| ConfigError {
                    key: LOG_LEVEL_ENV,
                    value: raw.clone(),
                    expected: "trace|debug|info|warn|error",
                })?
                .to_string(),
            None => default_log_level().to_string(),
        };

        let log_dir = read(LOG_DIR_ENV).map(PathBuf::from);
        if let Some(dir) = &log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError {
                    key: LOG_DIR_ENV,
                    value: dir.display().to_string(),
                    expected: "an absolute directory path",
                });
            }
        }

        let folder_delete_mode = match read(FOLDER_DELETE_MODE_ENV) {
            Some(raw) => FolderDeleteMode::parse(&raw).ok_or(ConfigError {
                key: FOLDER_DELETE_MODE_ENV,
                value: raw,
                expected: "dissolve|cascade",
            })?,
            None => FolderDeleteMode::default(),
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
            folder_delete_mode,
        })
    }
}
