//! Classline cryptographic primitives.
//!
//! Pure building blocks for pairwise message confidentiality. Functions are
//! deterministic; callers provide random bytes, which keeps every operation
//! reproducible under simulation.
//!
//! # Key Lifecycle
//!
//! Each conversation involves exactly two users. Both sides derive the same
//! symmetric key independently from the ordered pair of user ids:
//!
//! ```text
//! (user A, user B) — sorted
//!        │
//!        ▼
//! HKDF-SHA256 → Pair Key (32 bytes, per user pair)
//!        │
//!        ▼
//! XChaCha20-Poly1305 → Sealed message (24-byte nonce + ciphertext)
//! ```
//!
//! # Security
//!
//! This scheme is a compatibility contract, not a cryptographic guarantee:
//!
//! - The key is derived from public identifiers with no secret input, so any
//!   party that knows both user ids — including the server — can derive it.
//!   It resists casual inspection of data at rest and nothing stronger.
//! - There is no forward secrecy: one derived key covers the pair's entire
//!   history.
//! - AEAD still provides tamper evidence: a modified ciphertext fails
//!   authentication and surfaces as a decryption failure, never as silently
//!   corrupted plaintext.
//!
//! Upgrading to a real key-exchange protocol would change the wire format and
//! is deliberately out of scope here.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod pairwise;

pub use pairwise::{
    NONCE_SIZE, PairKey, PairwiseError, SealedMessage, derive_pair_key, open_message,
    seal_message,
};
