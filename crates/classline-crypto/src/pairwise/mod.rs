//! Pairwise key derivation and message sealing.

mod derivation;
mod encryption;
mod error;

pub use derivation::{PairKey, derive_pair_key};
pub use encryption::{NONCE_SIZE, SealedMessage, open_message, seal_message};
pub use error::PairwiseError;
