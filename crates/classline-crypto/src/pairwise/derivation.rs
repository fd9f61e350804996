//! Pair key derivation using HKDF.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Label used for pair key derivation (domain separation).
const PAIR_KEY_LABEL: &[u8] = b"classlinePairwiseV1";

/// Symmetric key shared by exactly one pair of users.
///
/// Zeroized on drop. Intentionally no `Debug` of the raw bytes.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PairKey([u8; 32]);

impl PairKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PairKey(..)")
    }
}

/// Derive the symmetric key for a pair of users.
///
/// The two ids are sorted before derivation, so both participants derive the
/// same key independently with no key-exchange round trip:
/// `derive_pair_key(a, b) == derive_pair_key(b, a)`.
///
/// Ids are length-prefixed in the input key material so that distinct pairs
/// can never collapse to the same byte string (`("ab", "c")` vs `("a", "bc")`).
///
/// # Security
///
/// The inputs are public identifiers — see the crate docs for what this
/// scheme does and does not protect against.
pub fn derive_pair_key(user_a: &str, user_b: &str) -> PairKey {
    let (lo, hi) = if user_a <= user_b { (user_a, user_b) } else { (user_b, user_a) };

    let mut ikm = Vec::with_capacity(8 + lo.len() + hi.len());
    ikm.extend_from_slice(&(lo.len() as u32).to_be_bytes());
    ikm.extend_from_slice(lo.as_bytes());
    ikm.extend_from_slice(&(hi.len() as u32).to_be_bytes());
    ikm.extend_from_slice(hi.as_bytes());

    let hkdf = Hkdf::<Sha256>::new(None, &ikm);

    let mut key = [0u8; 32];
    let Ok(()) = hkdf.expand(PAIR_KEY_LABEL, &mut key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    ikm.zeroize();
    PairKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_produces_32_byte_key() {
        let key = derive_pair_key("alice", "bob");
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn derive_is_deterministic() {
        let key1 = derive_pair_key("alice", "bob");
        let key2 = derive_pair_key("alice", "bob");
        assert_eq!(key1, key2, "same inputs must produce same key");
    }

    #[test]
    fn derive_is_symmetric_in_pair_order() {
        let key_ab = derive_pair_key("alice", "bob");
        let key_ba = derive_pair_key("bob", "alice");
        assert_eq!(key_ab, key_ba, "both participants must derive the same key");
    }

    #[test]
    fn different_pairs_produce_different_keys() {
        let key_ab = derive_pair_key("alice", "bob");
        let key_ac = derive_pair_key("alice", "carol");
        assert_ne!(key_ab, key_ac);
    }

    #[test]
    fn length_prefix_prevents_boundary_collisions() {
        // Without length prefixes these two pairs would concatenate to the
        // same input key material.
        let key1 = derive_pair_key("ab", "c");
        let key2 = derive_pair_key("a", "bc");
        assert_ne!(key1, key2);
    }

    #[test]
    fn works_with_empty_and_long_ids() {
        let _ = derive_pair_key("", "bob");
        let long = "x".repeat(1024);
        let _ = derive_pair_key(&long, "bob");
    }

    #[test]
    fn self_pair_is_valid() {
        // Degenerate but must not panic; some flows message yourself.
        let key = derive_pair_key("alice", "alice");
        assert_eq!(key.as_bytes().len(), 32);
    }
}
