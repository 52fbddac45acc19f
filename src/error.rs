use thiserror::Error;

#[derive(Error, Debug)]
pub enum RudixError {
    #[error("Malformed version: '{0}'")]
    MalformedVersion(String),

    #[error("Invalid package filename: '{0}'")]
    InvalidPackageFilename(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transfer failed: {0}")]
    Transport(String),

    #[error("Package database query failed: {0}")]
    PackageDatabase(String),

    #[error("Installer failed: {0}")]
    Installer(String),

    #[error("This operation requires administrator (root) privileges!")]
    PermissionDenied,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of a catalogue synchronization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Could not synchronize with '{url}': {reason}")]
    ManifestUnavailable { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, RudixError>;
