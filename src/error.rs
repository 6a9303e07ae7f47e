//! Error types for the task tracker.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Record store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be created, read, decoded or written.
    #[error("Task file {path} unavailable: {reason}")]
    Unavailable { path: String, reason: String },

    #[error("Task {id} not found")]
    TaskNotFound { id: u64 },
}

/// Notification transport errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("Transport failed: {reason}")]
    Transport { reason: String, transient: bool },
}

impl NotifyError {
    /// Whether a second attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, NotifyError::Transport { transient: true, .. })
    }
}

/// Per-task failures recorded by a reminder scan. Never aborts the scan.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("Invalid deadline {value:?}")]
    InvalidDate { value: String },

    #[error(transparent)]
    Transport(#[from] NotifyError),
}
