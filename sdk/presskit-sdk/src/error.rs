use crate::core::provider::ProviderError;
use thiserror::Error;

/// SDK-specific error types for PressKit operations
#[derive(Debug, Error)]
pub enum PressKitError {
    /// Provider not initialized yet; wait for `Session::initialize`
    #[error("Wallet provider is not initialized")]
    ProviderUnavailable,

    /// Interactive wallet prompt was declined
    #[error("Request rejected by user: {0}")]
    UserRejected(String),

    /// No sub-account could be found or created for the origin
    #[error("Sub-account unavailable for {origin}: {reason}")]
    DelegationUnavailable { origin: String, reason: String },

    /// Contract read failed; the previous display state is kept
    #[error("Read failed: {0}")]
    ReadFailure(String),

    /// Wallet refused the batch before returning an id
    #[error("Batch submission failed: {0}")]
    SubmissionFailure(String),

    /// Batch accepted but no terminal status seen in time
    #[error("Batch {id} unconfirmed after {attempts} status checks")]
    PollTimeout { id: String, attempts: u32 },

    /// Batch accepted but reported as failed or rejected
    #[error("Batch {id} unconfirmed: wallet reported {status}")]
    PollFailure { id: String, status: String },

    /// No primary or delegated account yet
    #[error("Not connected")]
    NotConnected,

    /// A press is already in flight
    #[error("Another submission is still in flight")]
    Busy,

    /// Work cancelled through the session token
    #[error("Operation cancelled")]
    Cancelled,

    /// Provider returned a JSON-RPC error
    #[error("Provider error: {0}")]
    Rpc(#[from] ProviderError),

    /// Provider returned a payload we could not interpret
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid session configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PressKitError {
    /// Map a provider error, promoting EIP-1193 user rejections.
    pub fn from_provider(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            Self::UserRejected(err.message)
        } else {
            Self::Rpc(err)
        }
    }

    /// Wallet does not implement the requested method.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Rpc(e) if e.is_unsupported())
    }

    /// Errors after the batch left the client: on-chain fate unknown.
    pub fn is_unconfirmed(&self) -> bool {
        matches!(self, Self::PollTimeout { .. } | Self::PollFailure { .. })
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, PressKitError>;
