//! Error types for engine operations.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, HeartfyError>;

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum HeartfyError {
    /// An interaction requiring a non-anonymous identity was attempted
    /// without one. Surfaced as a prompt to authenticate, not a fatal error.
    #[error("Authentication required")]
    AuthRequired,

    /// Identity-to-profile synchronization failed
    #[error("Sync error: {0}")]
    Sync(String),

    /// Realtime subscription delivery failed
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// A remote mutation failed
    #[error("Mutation error: {0}")]
    Mutation(String),

    /// One half of a two-part mutation failed after the other succeeded
    #[error("Partial mutation: {0}")]
    PartialMutation(String),

    /// An admin-only capability was invoked without admin privilege
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Invalid input or arguments
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HeartfyError {
    /// Creates a new sync error.
    pub fn sync<T: ToString>(msg: T) -> Self {
        Self::Sync(msg.to_string())
    }

    /// Creates a new subscription error.
    pub fn subscription<T: ToString>(msg: T) -> Self {
        Self::Subscription(msg.to_string())
    }

    /// Creates a new mutation error.
    pub fn mutation<T: ToString>(msg: T) -> Self {
        Self::Mutation(msg.to_string())
    }

    /// Creates a new partial mutation error.
    pub fn partial_mutation<T: ToString>(msg: T) -> Self {
        Self::PartialMutation(msg.to_string())
    }

    /// Creates a new permission error.
    pub fn permission<T: ToString>(msg: T) -> Self {
        Self::Permission(msg.to_string())
    }

    /// Creates a new validation error.
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Creates a new not-found error.
    pub fn not_found<T: ToString>(msg: T) -> Self {
        Self::NotFound(msg.to_string())
    }

    /// Creates a new serialization error.
    pub fn serialization<T: ToString>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Creates a new configuration error.
    pub fn config<T: ToString>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }
}

impl From<serde_json::Error> for HeartfyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
