use std::path::PathBuf;

use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] fcfe_core::ValidationError),

    #[error(transparent)]
    Configuration(#[from] fcfe_core::ConfigurationError),

    #[error("snapshot not found: {}", path.display())]
    SnapshotNotFound { path: PathBuf },

    #[error("invalid snapshot {}: {message}", path.display())]
    InvalidSnapshot { path: PathBuf, message: String },

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Configuration(_) => 2,
            Self::SnapshotNotFound { .. } => 2,
            Self::InvalidSnapshot { .. } => 2,
            Self::Command(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
