//! Location provider error types

use thiserror::Error;

/// Errors reported by a location provider
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// `start` was called before a fix handler was registered
    #[error("no fix handler configured")]
    NotConfigured,
    #[error("provider is already running")]
    AlreadyRunning,
    #[error("provider is not running")]
    NotRunning,
    /// The platform refused access to location data
    #[error("location permission denied")]
    PermissionDenied,
    /// No location source is available
    #[error("location provider unavailable: {reason}")]
    Unavailable { reason: String },
    /// A recorded track could not be read or parsed
    #[error("track error: {message}")]
    Track { message: String },
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// Whether retrying the same operation later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Unavailable { .. })
    }
}
