// Copyright (C) 2014-2026 The Crown Developers.
//
// hash.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Hash functions for Crown cryptography.

use crown_core::{UInt160, UInt256};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes RIPEMD-160 hash of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes Hash160 (RIPEMD-160 of SHA-256) of the input data.
/// Key ids and addresses are derived with it.
pub fn hash160(data: &[u8]) -> UInt160 {
    UInt160::from_bytes(ripemd160(&sha256(data)))
}

/// Computes Hash256 (double SHA-256) of the input data.
/// Used for transaction ids, message digests and dedup keys.
pub fn hash256(data: &[u8]) -> UInt256 {
    UInt256::from_bytes(sha256(&sha256(data)))
}
