// Copyright (C) 2014-2026 The Crown Developers.
//
// broadcast.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Service-node announcement, signed by the collateral key.
//!
//! The collateral key signs `hash256` of the canonical encoding of
//! `outpoint || addr || collateral_pubkey || node_pubkey || sig_time ||
//! protocol_version`. The same digest is the dedup key of the broadcast.
//! The embedded ping is carried along but is neither hashed nor signed, so
//! a newer ping can be patched into a cached broadcast without
//! invalidating it.
//!
//! The optional signover is the collateral key's signature over
//! `node_pubkey.hash()`, delegating staking rights to the node key.

use super::ping::ServiceNodePing;
use crown_core::{OutPoint, UInt256};
use crown_cryptography::{hash256, CompactSignature, HashSigner, KeyPair, PublicKey};
use crown_io::{BinaryWriter, IoResult, MemoryReader, Serializable};
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNodeBroadcast {
    pub outpoint: OutPoint,
    pub addr: SocketAddr,
    pub collateral_pubkey: PublicKey,
    pub node_pubkey: PublicKey,
    pub sig_time: i64,
    pub protocol_version: u32,
    pub signature: CompactSignature,
    pub signover: Option<CompactSignature>,
    pub last_ping: Option<ServiceNodePing>,
}

impl ServiceNodeBroadcast {
    /// Creates a broadcast for a freshly started node: the node key signs
    /// the embedded ping and the collateral key signs the announcement and,
    /// when `with_signover` is set, the node key.
    pub fn create(
        outpoint: OutPoint,
        addr: SocketAddr,
        collateral: &KeyPair,
        node: &KeyPair,
        protocol_version: u32,
        sig_time: i64,
        with_signover: bool,
    ) -> crown_cryptography::Result<Self> {
        let ping = ServiceNodePing::new_signed(outpoint, sig_time, node.private_key())?;
        let digest = Self::digest(
            &outpoint,
            &addr,
            collateral.public_key(),
            node.public_key(),
            sig_time,
            protocol_version,
        );
        let signature = HashSigner::sign(&digest, collateral.private_key())?;
        let signover = if with_signover {
            Some(HashSigner::sign(
                &node.public_key().hash(),
                collateral.private_key(),
            )?)
        } else {
            None
        };

        Ok(Self {
            outpoint,
            addr,
            collateral_pubkey: *collateral.public_key(),
            node_pubkey: *node.public_key(),
            sig_time,
            protocol_version,
            signature,
            signover,
            last_ping: Some(ping),
        })
    }

    fn digest(
        outpoint: &OutPoint,
        addr: &SocketAddr,
        collateral_pubkey: &PublicKey,
        node_pubkey: &PublicKey,
        sig_time: i64,
        protocol_version: u32,
    ) -> UInt256 {
        let mut writer = BinaryWriter::with_capacity(192);
        outpoint.serialize(&mut writer);
        writer.write_socket_addr(addr);
        collateral_pubkey.serialize(&mut writer);
        node_pubkey.serialize(&mut writer);
        writer.write_i64(sig_time);
        writer.write_u32(protocol_version);
        hash256(writer.as_bytes())
    }

    /// Digest the collateral key signs; also the dedup key.
    pub fn hash(&self) -> UInt256 {
        Self::digest(
            &self.outpoint,
            &self.addr,
            &self.collateral_pubkey,
            &self.node_pubkey,
            self.sig_time,
            self.protocol_version,
        )
    }

    /// Checks the collateral key's signature over the announcement.
    pub fn verify_signature(&self) -> crown_cryptography::Result<()> {
        HashSigner::verify_pubkey(&self.hash(), &self.signature, &self.collateral_pubkey)
    }

    /// Checks the signover against the collateral key. `None` when the
    /// broadcast carries no signover.
    pub fn verify_signover(&self) -> Option<crown_cryptography::Result<()>> {
        self.signover.as_ref().map(|signover| {
            HashSigner::verify_pubkey(&self.node_pubkey.hash(), signover, &self.collateral_pubkey)
        })
    }
}

impl Serializable for ServiceNodeBroadcast {
    fn size(&self) -> usize {
        self.outpoint.size()
            + 18
            + self.collateral_pubkey.size()
            + self.node_pubkey.size()
            + 8
            + 4
            + self.signature.size()
            + 1
            + self.signover.as_ref().map_or(0, |s| s.size())
            + 1
            + self.last_ping.as_ref().map_or(0, |p| p.size())
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        self.outpoint.serialize(writer);
        writer.write_socket_addr(&self.addr);
        self.collateral_pubkey.serialize(writer);
        self.node_pubkey.serialize(writer);
        writer.write_i64(self.sig_time);
        writer.write_u32(self.protocol_version);
        self.signature.serialize(writer);
        writer.write_bool(self.signover.is_some());
        if let Some(signover) = &self.signover {
            signover.serialize(writer);
        }
        writer.write_bool(self.last_ping.is_some());
        if let Some(ping) = &self.last_ping {
            ping.serialize(writer);
        }
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        let outpoint = OutPoint::deserialize(reader)?;
        let addr = reader.read_socket_addr()?;
        let collateral_pubkey = PublicKey::deserialize(reader)?;
        let node_pubkey = PublicKey::deserialize(reader)?;
        let sig_time = reader.read_i64()?;
        let protocol_version = reader.read_u32()?;
        let signature = CompactSignature::deserialize(reader)?;
        let signover = if reader.read_bool()? {
            Some(CompactSignature::deserialize(reader)?)
        } else {
            None
        };
        let last_ping = if reader.read_bool()? {
            Some(ServiceNodePing::deserialize(reader)?)
        } else {
            None
        };
        Ok(Self {
            outpoint,
            addr,
            collateral_pubkey,
            node_pubkey,
            sig_time,
            protocol_version,
            signature,
            signover,
            last_ping,
        })
    }
}
