//! Error types for the menu subsystem.
//!
//! Only registration and configuration can fail. Refusing a command because
//! its required flags are missing is an ordinary outcome reported through
//! [`MenuManager::report_if_action_not_allowed`](crate::MenuManager::report_if_action_not_allowed),
//! not an error.

use std::path::PathBuf;

/// Result type alias for menu operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while registering flags or loading preferences.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Every bit of the command flag set is already assigned.
    #[error("Cannot register command flag '{name}': all {capacity} flag bits are in use")]
    FlagCapacityExceeded { name: String, capacity: usize },

    /// A flag with the same name was registered before.
    #[error("Command flag '{0}' is already registered")]
    DuplicateFlagName(String),

    /// Preferences file could not be read.
    #[error("Failed to read preferences '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Preferences text is not valid TOML for [`MenuPreferences`](crate::MenuPreferences).
    #[error("Failed to parse preferences: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Preferences could not be written back out as TOML.
    #[error("Failed to serialize preferences: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Create a preferences read error.
    pub fn config_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }
}
