//! Pairwise key cache.
//!
//! Derives the symmetric key for each (self, peer) pair once and reuses it
//! for every seal/open in that conversation. Derivation is cheap but not
//! free, and the cache also keeps key handling in one place.

use std::collections::HashMap;

use classline_crypto::{
    NONCE_SIZE, PairKey, PairwiseError, SealedMessage, derive_pair_key, open_message,
    seal_message,
};
use classline_proto::UserId;

/// Per-peer pairwise keys for the authenticated user.
pub struct PairKeyCache {
    self_id: UserId,
    keys: HashMap<UserId, PairKey>,
}

impl PairKeyCache {
    /// Create an empty cache for the authenticated user.
    pub fn new(self_id: UserId) -> Self {
        Self { self_id, keys: HashMap::new() }
    }

    /// The authenticated user this cache belongs to.
    pub fn self_id(&self) -> &UserId {
        &self.self_id
    }

    /// Seal a plaintext body for a peer, returning the wire string.
    pub fn seal_for(&mut self, peer: &UserId, plaintext: &str, nonce: [u8; NONCE_SIZE]) -> String {
        let key = self.key_for(peer);
        seal_message(plaintext, key, nonce).to_wire()
    }

    /// Open a wire-form body from (or to) a peer.
    ///
    /// # Errors
    ///
    /// `PairwiseError::DecryptionFailed` for malformed wire text or
    /// authentication failure; callers substitute the redacted placeholder.
    pub fn open_from(&mut self, peer: &UserId, wire: &str) -> Result<String, PairwiseError> {
        let sealed = SealedMessage::from_wire(wire)?;
        let key = self.key_for(peer);
        open_message(&sealed, key)
    }

    fn key_for(&mut self, peer: &UserId) -> &PairKey {
        self.keys
            .entry(peer.clone())
            .or_insert_with(|| derive_pair_key(self.self_id.as_str(), peer.as_str()))
    }
}
