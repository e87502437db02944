//! Error types for Keyroot

/// Main error type for Keyroot operations
#[derive(Debug, thiserror::Error)]
pub enum KeyrootError {
    /// The shared store could not be reached, timed out, or failed
    /// mid-operation. Never retried internally.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The shared record holds only one half of the keypair: a losing-race
    /// residue or a winner that crashed (or is still mid-write). The caller
    /// may retry after a delay or escalate if it persists.
    #[error("Provisioning incomplete: {0}")]
    ProvisioningIncomplete(String),

    /// This instance claimed the public field but the private field was
    /// already taken. The stored record can no longer be trusted; never
    /// retried with a fresh keypair.
    #[error("Provisioning conflict: {0}")]
    ProvisioningConflict(String),

    /// Malformed or non-matching ciphertext. Recoverable: reject the input.
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// A token was not produced by the matching private key. Recoverable:
    /// reject the input.
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Key material could not be parsed. Surfaced before any store
    /// interaction.
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl KeyrootError {
    /// Whether the caller may meaningfully retry the failed operation.
    ///
    /// `ProvisioningIncomplete` usually means another instance is mid-write;
    /// a delayed retry is expected to observe the finished record.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::ProvisioningIncomplete(_)
        )
    }
}

impl From<redis::RedisError> for KeyrootError {
    fn from(err: redis::RedisError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

/// Result type alias for Keyroot operations
pub type Result<T> = std::result::Result<T, KeyrootError>;
