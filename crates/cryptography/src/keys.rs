// Copyright (C) 2014-2026 The Crown Developers.
//
// keys.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! secp256k1 key material.

use crate::{hash::hash160, hash::hash256, Error, Result};
use crown_config::NetworkType;
use crown_core::UInt160;
use crown_io::{BinaryWriter, IoError, IoResult, MemoryReader, Serializable};
use rand::RngCore;
use secp256k1::{PublicKey as Secp256k1PublicKey, SecretKey, SECP256K1};
use std::fmt;

/// A public verification key together with the encoding it is identified by.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    inner: Secp256k1PublicKey,
    compressed: bool,
}

impl PublicKey {
    pub(crate) fn from_secp(inner: Secp256k1PublicKey, compressed: bool) -> Self {
        Self { inner, compressed }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let inner = Secp256k1PublicKey::from_slice(bytes)
            .map_err(|e| Error::InvalidKey(format!("Invalid public key: {e}")))?;
        Ok(Self {
            inner,
            compressed: bytes.len() == 33,
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Serialized key in its identifying encoding (33 or 65 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.inner.serialize().to_vec()
        } else {
            self.inner.serialize_uncompressed().to_vec()
        }
    }

    /// Key id: Hash160 of the serialized key.
    pub fn key_id(&self) -> UInt160 {
        hash160(&self.to_bytes())
    }

    /// Hash256 of the serialized key; a signover signs this digest.
    pub fn hash(&self) -> crown_core::UInt256 {
        hash256(&self.to_bytes())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl Serializable for PublicKey {
    fn size(&self) -> usize {
        if self.compressed {
            34
        } else {
            66
        }
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_var_bytes(&self.to_bytes());
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        let bytes = reader.read_var_bytes(65)?;
        Self::from_slice(&bytes).map_err(|e| IoError::InvalidData(e.to_string()))
    }
}

/// A private signing key.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: SecretKey,
    compressed: bool,
}

impl PrivateKey {
    /// Generates a fresh random key with a compressed public key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            if let Ok(secret) = SecretKey::from_slice(&bytes) {
                return Self {
                    secret,
                    compressed: true,
                };
            }
        }
    }

    pub fn from_bytes(bytes: &[u8], compressed: bool) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| Error::InvalidKey(format!("Invalid private key: {e}")))?;
        Ok(Self { secret, compressed })
    }

    /// Decodes a WIF secret: `prefix || key || [0x01] || checksum`.
    pub fn from_wif(wif: &str, network: NetworkType) -> Result<Self> {
        let data = bs58::decode(wif.trim())
            .into_vec()
            .map_err(|e| Error::InvalidWif(e.to_string()))?;
        let (payload, checksum) = match data.len() {
            37 | 38 => data.split_at(data.len() - 4),
            len => return Err(Error::InvalidWif(format!("unexpected length {len}"))),
        };
        if hash256(payload).as_bytes()[..4] != *checksum {
            return Err(Error::InvalidWif("checksum mismatch".to_string()));
        }
        if payload[0] != network.secret_key_prefix() {
            return Err(Error::InvalidWif(format!(
                "prefix 0x{:02x} does not belong to {network}",
                payload[0]
            )));
        }
        let compressed = match payload.len() {
            33 => false,
            34 if payload[33] == 0x01 => true,
            _ => return Err(Error::InvalidWif("bad compression flag".to_string())),
        };
        Self::from_bytes(&payload[1..33], compressed)
    }

    pub fn to_wif(&self, network: NetworkType) -> String {
        let mut payload = Vec::with_capacity(38);
        payload.push(network.secret_key_prefix());
        payload.extend_from_slice(&self.secret.secret_bytes());
        if self.compressed {
            payload.push(0x01);
        }
        let checksum = hash256(&payload);
        payload.extend_from_slice(&checksum.as_bytes()[..4]);
        bs58::encode(payload).into_string()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secp(
            Secp256k1PublicKey::from_secret_key(SECP256K1, &self.secret),
            self.compressed,
        )
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(<redacted>)")
    }
}

/// A private key with its public key cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    pub fn new(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    pub fn generate() -> Self {
        Self::new(PrivateKey::generate())
    }

    pub fn from_wif(wif: &str, network: NetworkType) -> Result<Self> {
        PrivateKey::from_wif(wif, network).map(Self::new)
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn key_id(&self) -> UInt160 {
        self.public_key.key_id()
    }
}
