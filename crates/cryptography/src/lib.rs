// Copyright (C) 2014-2026 The Crown Developers.
//
// lib.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Cryptographic primitives for Crown service nodes.
//!
//! Every service-node message is authenticated with a 65-byte recoverable
//! secp256k1 signature: a header byte encoding the recovery id and key
//! compression, followed by the compact `r || s`. Verification recovers
//! the signer's public key and compares identities, so a verifier only
//! needs the expected key id.

pub mod hash;
pub mod keys;
pub mod signer;

pub use hash::{hash160, hash256, ripemd160, sha256};
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use signer::{CompactSignature, HashSigner, MessageSigner, COMPACT_SIGNATURE_SIZE};

use crown_core::UInt160;
use thiserror::Error;

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Cryptography errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Error recovering public key.")]
    RecoveryFailed,

    #[error("Keys don't match: pubkey={expected}, pubkeyFromSig={recovered}")]
    KeysDontMatch {
        expected: UInt160,
        recovered: UInt160,
    },

    #[error("Invalid WIF: {0}")]
    InvalidWif(String),
}
