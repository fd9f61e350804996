//! Property-based tests for pairwise sealing.
//!
//! Decryption must invert encryption for any plaintext and any user pair,
//! opening must be a pure function, and the wire form must never lose
//! information.

use classline_crypto::{
    NONCE_SIZE, SealedMessage, derive_pair_key, open_message, seal_message,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_open_inverts_seal(
        a in "[a-z0-9]{1,24}",
        b in "[a-z0-9]{1,24}",
        body in ".*",
        nonce in prop::array::uniform24(any::<u8>()),
    ) {
        let key = derive_pair_key(&a, &b);
        let sealed = seal_message(&body, &key, nonce);
        prop_assert_eq!(open_message(&sealed, &key).unwrap(), body);
    }

    #[test]
    fn prop_pair_order_is_irrelevant(
        a in "[a-z0-9]{1,24}",
        b in "[a-z0-9]{1,24}",
        body in ".*",
        nonce in prop::array::uniform24(any::<u8>()),
    ) {
        let sealed = seal_message(&body, &derive_pair_key(&a, &b), nonce);
        let opened = open_message(&sealed, &derive_pair_key(&b, &a));
        prop_assert_eq!(opened.unwrap(), body);
    }

    #[test]
    fn prop_open_twice_is_stable(
        a in "[a-z0-9]{1,24}",
        b in "[a-z0-9]{1,24}",
        body in ".*",
        nonce in prop::array::uniform24(any::<u8>()),
    ) {
        let key = derive_pair_key(&a, &b);
        let sealed = seal_message(&body, &key, nonce);
        prop_assert_eq!(open_message(&sealed, &key), open_message(&sealed, &key));
    }

    #[test]
    fn prop_wire_form_roundtrips(
        body in ".*",
        nonce in prop::array::uniform24(any::<u8>()),
    ) {
        let key = derive_pair_key("alice", "bob");
        let sealed = seal_message(&body, &key, nonce);
        let parsed = SealedMessage::from_wire(&sealed.to_wire()).unwrap();
        prop_assert_eq!(parsed, sealed);
    }

    #[test]
    fn prop_wire_parse_never_panics(text in ".*") {
        let _ = SealedMessage::from_wire(&text);
    }

    #[test]
    fn prop_cross_pair_opening_fails(
        body in ".+",
        nonce in prop::array::uniform24(any::<u8>()),
    ) {
        let sealed = seal_message(&body, &derive_pair_key("alice", "bob"), nonce);
        prop_assert!(open_message(&sealed, &derive_pair_key("alice", "carol")).is_err());
    }
}

#[test]
fn nonce_size_matches_xchacha() {
    assert_eq!(NONCE_SIZE, 24);
}
