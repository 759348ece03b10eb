// Copyright (C) 2014-2026 The Crown Developers.
//
// signer.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Recoverable signatures over 256-bit digests.

use crate::{hash::hash256, keys::PublicKey, Error, PrivateKey, Result};
use crown_core::{UInt160, UInt256};
use crown_io::{BinaryWriter, IoError, IoResult, MemoryReader, Serializable};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, SECP256K1,
};
use std::fmt;

/// Header byte + `r` + `s`
pub const COMPACT_SIGNATURE_SIZE: usize = 65;

/// Header offset for the recovery id; `+4` marks a compressed key.
const HEADER_BASE: u8 = 27;

/// Prefix hashed in front of every human-facing signed message.
pub const MESSAGE_MAGIC: &str = "Crown Signed Message:\n";

/// A 65-byte recoverable compact signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompactSignature([u8; COMPACT_SIGNATURE_SIZE]);

impl CompactSignature {
    pub fn from_bytes(bytes: [u8; COMPACT_SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; COMPACT_SIGNATURE_SIZE] = bytes.try_into().map_err(|_| {
            Error::InvalidSignature(format!(
                "expected {COMPACT_SIGNATURE_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; COMPACT_SIGNATURE_SIZE] {
        &self.0
    }
}

impl fmt::Debug for CompactSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompactSignature({})", hex::encode(self.0))
    }
}

impl Serializable for CompactSignature {
    fn size(&self) -> usize {
        1 + COMPACT_SIGNATURE_SIZE
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_var_bytes(&self.0);
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        let bytes = reader.read_var_bytes(COMPACT_SIGNATURE_SIZE)?;
        Self::from_slice(&bytes).map_err(|e| IoError::InvalidData(e.to_string()))
    }
}

/// Stateless sign/verify over digests.
pub struct HashSigner;

impl HashSigner {
    /// Produces a deterministic (RFC 6979) recoverable signature.
    pub fn sign(digest: &UInt256, key: &PrivateKey) -> Result<CompactSignature> {
        let message = Message::from_digest_slice(digest.as_bytes())
            .map_err(|e| Error::InvalidSignature(format!("Invalid message hash: {e}")))?;
        let signature = SECP256K1.sign_ecdsa_recoverable(&message, key.secret());
        let (recovery_id, data) = signature.serialize_compact();

        let mut bytes = [0u8; COMPACT_SIGNATURE_SIZE];
        bytes[0] = HEADER_BASE
            + recovery_id.to_i32() as u8
            + if key.is_compressed() { 4 } else { 0 };
        bytes[1..].copy_from_slice(&data);
        Ok(CompactSignature(bytes))
    }

    /// Recovers the public key that produced `signature` over `digest`.
    pub fn recover(digest: &UInt256, signature: &CompactSignature) -> Result<PublicKey> {
        let header = signature.0[0];
        if !(HEADER_BASE..HEADER_BASE + 8).contains(&header) {
            return Err(Error::InvalidSignature(format!(
                "invalid header byte {header}"
            )));
        }
        let recid = i32::from((header - HEADER_BASE) & 3);
        let compressed = (header - HEADER_BASE) & 4 != 0;

        let recovery_id = RecoveryId::from_i32(recid).map_err(|_| Error::RecoveryFailed)?;
        let recoverable = RecoverableSignature::from_compact(&signature.0[1..], recovery_id)
            .map_err(|_| Error::RecoveryFailed)?;
        let message =
            Message::from_digest_slice(digest.as_bytes()).map_err(|_| Error::RecoveryFailed)?;
        let recovered = SECP256K1
            .recover_ecdsa(&message, &recoverable)
            .map_err(|_| Error::RecoveryFailed)?;
        Ok(PublicKey::from_secp(recovered, compressed))
    }

    /// Succeeds iff the key recovered from `signature` has id `expected`.
    pub fn verify(digest: &UInt256, signature: &CompactSignature, expected: &UInt160) -> Result<()> {
        let recovered = Self::recover(digest, signature)?.key_id();
        if recovered != *expected {
            return Err(Error::KeysDontMatch {
                expected: *expected,
                recovered,
            });
        }
        Ok(())
    }

    /// Verifies against a known public key.
    pub fn verify_pubkey(
        digest: &UInt256,
        signature: &CompactSignature,
        public_key: &PublicKey,
    ) -> Result<()> {
        Self::verify(digest, signature, &public_key.key_id())
    }
}

/// Sign/verify for free-form text, domain-separated by [`MESSAGE_MAGIC`].
pub struct MessageSigner;

impl MessageSigner {
    /// `hash256(varstr(magic) || varstr(message))`
    pub fn message_hash(message: &str) -> UInt256 {
        let mut writer = BinaryWriter::new();
        writer.write_var_string(MESSAGE_MAGIC);
        writer.write_var_string(message);
        hash256(writer.as_bytes())
    }

    pub fn sign_message(message: &str, key: &PrivateKey) -> Result<CompactSignature> {
        HashSigner::sign(&Self::message_hash(message), key)
    }

    pub fn verify_message(
        public_key: &PublicKey,
        signature: &CompactSignature,
        message: &str,
    ) -> Result<()> {
        HashSigner::verify_pubkey(&Self::message_hash(message), signature, public_key)
    }
}
