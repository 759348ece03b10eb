// Copyright (C) 2014-2026 The Crown Developers.
//
// ping.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Liveness ping, signed by the node key.

use crown_core::{OutPoint, UInt256};
use crown_cryptography::{hash256, CompactSignature, HashSigner, PrivateKey, PublicKey};
use crown_io::{BinaryWriter, IoResult, MemoryReader, Serializable};

/// Periodic proof that the node behind a collateral output is alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNodePing {
    pub outpoint: OutPoint,
    pub sig_time: i64,
    pub signature: CompactSignature,
}

impl ServiceNodePing {
    /// Builds and signs a ping for `outpoint` at `sig_time`.
    pub fn new_signed(
        outpoint: OutPoint,
        sig_time: i64,
        node_key: &PrivateKey,
    ) -> crown_cryptography::Result<Self> {
        let signature = HashSigner::sign(&Self::digest(&outpoint, sig_time), node_key)?;
        Ok(Self {
            outpoint,
            sig_time,
            signature,
        })
    }

    fn digest(outpoint: &OutPoint, sig_time: i64) -> UInt256 {
        let mut writer = BinaryWriter::with_capacity(44);
        outpoint.serialize(&mut writer);
        writer.write_i64(sig_time);
        hash256(writer.as_bytes())
    }

    /// Digest the node key signs; also the dedup key of the ping.
    pub fn hash(&self) -> UInt256 {
        Self::digest(&self.outpoint, self.sig_time)
    }

    /// Checks that `node_pubkey` produced the signature.
    pub fn verify(&self, node_pubkey: &PublicKey) -> crown_cryptography::Result<()> {
        HashSigner::verify_pubkey(&self.hash(), &self.signature, node_pubkey)
    }
}

impl Serializable for ServiceNodePing {
    fn size(&self) -> usize {
        self.outpoint.size() + 8 + self.signature.size()
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        self.outpoint.serialize(writer);
        writer.write_i64(self.sig_time);
        self.signature.serialize(writer);
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        Ok(Self {
            outpoint: OutPoint::deserialize(reader)?,
            sig_time: reader.read_i64()?,
            signature: CompactSignature::deserialize(reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crown_cryptography::KeyPair;
    use crown_io::SerializableExt;

    fn outpoint() -> OutPoint {
        OutPoint::new(UInt256::from_bytes([5u8; 32]), 1)
    }

    #[test]
    fn test_ping_signed_by_node_key() {
        let node = KeyPair::generate();
        let ping = ServiceNodePing::new_signed(outpoint(), 1_000, node.private_key()).unwrap();
        assert!(ping.verify(node.public_key()).is_ok());
        assert!(ping.verify(KeyPair::generate().public_key()).is_err());
    }

    #[test]
    fn test_changing_time_invalidates_signature() {
        let node = KeyPair::generate();
        let mut ping = ServiceNodePing::new_signed(outpoint(), 1_000, node.private_key()).unwrap();
        let before = ping.hash();
        ping.sig_time += 1;
        assert_ne!(ping.hash(), before);
        assert!(ping.verify(node.public_key()).is_err());
    }

    #[test]
    fn test_wire_encoding() {
        let node = KeyPair::generate();
        let ping = ServiceNodePing::new_signed(outpoint(), 42, node.private_key()).unwrap();
        let bytes = ping.to_array();
        assert_eq!(bytes.len(), ping.size());
        assert_eq!(ServiceNodePing::from_array(&bytes).unwrap(), ping);
    }
}
