//! Error types for pairwise sealing.

use thiserror::Error;

/// Errors from pairwise message operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PairwiseError {
    /// Ciphertext could not be opened.
    ///
    /// Covers authentication failure (tampering or wrong key), malformed wire
    /// text, and non-UTF-8 plaintext. Callers render a redacted placeholder
    /// rather than dropping the message, preserving conversation ordering.
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// What went wrong, for logs only — never shown to the user.
        reason: String,
    },
}
