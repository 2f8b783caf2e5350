use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// The supplied root does not normalize to 8 digits. No network call is made.
    InvalidRoot(String),
    /// Reading the cached record failed. Also covers the post-sync re-read,
    /// which is surfaced to the user the same way.
    Fetch(String),
    /// Triggering the upstream synchronization failed. The orchestrator
    /// absorbs this variant; it never reaches the user directly.
    Sync(String),
    /// A lookup for the same root is already running.
    InFlight(String),
    /// Reading or writing persisted client state failed.
    Storage(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidRoot(msg) => write!(f, "Invalid root: {}", msg),
            AppError::Fetch(msg) => write!(f, "{}", msg),
            AppError::Sync(msg) => write!(f, "Synchronization failed: {}", msg),
            AppError::InFlight(root) => {
                write!(f, "A lookup for root {} is already in progress", root)
            }
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}
