//! Message sealing using XChaCha20-Poly1305.
//!
//! All functions are pure — random bytes must be provided by the caller.
//! This enables deterministic testing and keeps the action-based state
//! machines free of entropy sources.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};

use super::{derivation::PairKey, error::PairwiseError};

/// Size of the XChaCha20 nonce (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes).
const POLY1305_TAG_SIZE: usize = 16;

/// Version prefix of the sealed wire form.
const WIRE_PREFIX: &str = "cl1.";

/// A sealed message: nonce plus ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    /// The 24-byte XChaCha20 nonce.
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext including the 16-byte Poly1305 tag.
    pub ciphertext: Vec<u8>,
}

impl SealedMessage {
    /// Render as the wire string carried in chat bodies:
    /// `"cl1." + base64(nonce ‖ ciphertext)`.
    pub fn to_wire(&self) -> String {
        let mut raw = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        raw.extend_from_slice(&self.nonce);
        raw.extend_from_slice(&self.ciphertext);
        format!("{WIRE_PREFIX}{}", BASE64.encode(raw))
    }

    /// Parse the wire string form.
    ///
    /// # Errors
    ///
    /// `PairwiseError::DecryptionFailed` for an unknown prefix, invalid
    /// base64, or a payload too short to hold nonce and tag.
    pub fn from_wire(text: &str) -> Result<Self, PairwiseError> {
        let encoded = text.strip_prefix(WIRE_PREFIX).ok_or_else(|| {
            PairwiseError::DecryptionFailed { reason: "unknown wire format".to_string() }
        })?;

        let raw = BASE64.decode(encoded).map_err(|e| PairwiseError::DecryptionFailed {
            reason: format!("invalid base64: {e}"),
        })?;

        if raw.len() < NONCE_SIZE + POLY1305_TAG_SIZE {
            return Err(PairwiseError::DecryptionFailed {
                reason: format!("sealed payload too short: {} bytes", raw.len()),
            });
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&raw[..NONCE_SIZE]);

        Ok(Self { nonce, ciphertext: raw[NONCE_SIZE..].to_vec() })
    }
}

/// Seal a plaintext body for a user pair.
///
/// The caller MUST provide cryptographically secure random bytes for the
/// nonce in production; nonce reuse under the same key leaks plaintext
/// relationships.
pub fn seal_message(plaintext: &str, key: &PairKey, nonce: [u8; NONCE_SIZE]) -> SealedMessage {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(&nonce), plaintext.as_bytes()) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    SealedMessage { nonce, ciphertext }
}

/// Open a sealed message.
///
/// Pure: the same sealed input and key always yield the same result, and
/// opening has no side effects on either.
///
/// # Errors
///
/// `PairwiseError::DecryptionFailed` if the authentication tag or key is
/// incorrect, or if the plaintext is not valid UTF-8.
pub fn open_message(sealed: &SealedMessage, key: &PairKey) -> Result<String, PairwiseError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = XNonce::from_slice(&sealed.nonce);

    let plaintext = cipher.decrypt(nonce, sealed.ciphertext.as_slice()).map_err(|_| {
        PairwiseError::DecryptionFailed { reason: "authentication failed".to_string() }
    })?;

    String::from_utf8(plaintext).map_err(|_| PairwiseError::DecryptionFailed {
        reason: "plaintext is not valid UTF-8".to_string(),
    })
}
