// Copyright (C) 2014-2026 The Crown Developers.
//
// entry.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Roster entries.

use crown_config::RoleProfile;
use crown_core::{ChainView, OutPoint, UInt256};
use crown_cryptography::{CompactSignature, PublicKey};
use crown_network::{ServiceNodeBroadcast, ServiceNodePing};
use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;

/// Liveness of a roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceNodeState {
    Enabled,
    Expired,
    #[serde(rename = "REMOVE")]
    Removed,
    VinSpent,
}

impl fmt::Display for ServiceNodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ServiceNodeState::Enabled => "ENABLED",
            ServiceNodeState::Expired => "EXPIRED",
            ServiceNodeState::Removed => "REMOVE",
            ServiceNodeState::VinSpent => "VIN_SPENT",
        };
        f.write_str(text)
    }
}

/// One service node as tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNodeEntry {
    pub outpoint: OutPoint,
    pub addr: SocketAddr,
    pub collateral_pubkey: PublicKey,
    pub node_pubkey: PublicKey,
    pub sig_time: i64,
    pub protocol_version: u32,
    pub signature: CompactSignature,
    pub signover: Option<CompactSignature>,
    pub last_ping: Option<ServiceNodePing>,
    pub state: ServiceNodeState,
}

impl ServiceNodeEntry {
    pub fn from_broadcast(broadcast: &ServiceNodeBroadcast) -> Self {
        Self {
            outpoint: broadcast.outpoint,
            addr: broadcast.addr,
            collateral_pubkey: broadcast.collateral_pubkey,
            node_pubkey: broadcast.node_pubkey,
            sig_time: broadcast.sig_time,
            protocol_version: broadcast.protocol_version,
            signature: broadcast.signature,
            signover: broadcast.signover,
            last_ping: broadcast.last_ping.clone(),
            state: ServiceNodeState::Enabled,
        }
    }

    /// The broadcast this entry was built from, carrying the current ping.
    pub fn to_broadcast(&self) -> ServiceNodeBroadcast {
        ServiceNodeBroadcast {
            outpoint: self.outpoint,
            addr: self.addr,
            collateral_pubkey: self.collateral_pubkey,
            node_pubkey: self.node_pubkey,
            sig_time: self.sig_time,
            protocol_version: self.protocol_version,
            signature: self.signature,
            signover: self.signover,
            last_ping: self.last_ping.clone(),
        }
    }

    /// Dedup hash of the announcing broadcast.
    pub fn broadcast_hash(&self) -> UInt256 {
        self.to_broadcast().hash()
    }

    /// Takes over the announcement fields of a newer broadcast. The last
    /// ping only moves forward.
    pub fn apply_broadcast(&mut self, broadcast: &ServiceNodeBroadcast) {
        self.addr = broadcast.addr;
        self.collateral_pubkey = broadcast.collateral_pubkey;
        self.node_pubkey = broadcast.node_pubkey;
        self.sig_time = broadcast.sig_time;
        self.protocol_version = broadcast.protocol_version;
        self.signature = broadcast.signature;
        self.signover = broadcast.signover;
        if let Some(ping) = &broadcast.last_ping {
            self.apply_ping(ping);
        }
    }

    /// Replaces the last ping if `ping` is newer. Returns whether it did.
    pub fn apply_ping(&mut self, ping: &ServiceNodePing) -> bool {
        let newer = self
            .last_ping
            .as_ref()
            .map_or(true, |last| ping.sig_time > last.sig_time);
        if newer {
            self.last_ping = Some(ping.clone());
        }
        newer
    }

    /// Time of the last liveness proof, falling back to the announcement.
    pub fn last_ping_time(&self) -> i64 {
        self.last_ping
            .as_ref()
            .map_or(self.sig_time, |ping| ping.sig_time)
    }

    /// `|now - last ping| < seconds`
    pub fn is_pinged_within(&self, seconds: u64, now: i64) -> bool {
        now.abs_diff(self.last_ping_time()) < seconds
    }

    pub fn is_enabled(&self) -> bool {
        self.state == ServiceNodeState::Enabled
    }

    /// Recomputes the liveness state against the clock and the chain.
    pub fn check(&mut self, now: i64, chain: &dyn ChainView, profile: &RoleProfile) {
        if chain.output(&self.outpoint).is_none() {
            self.state = ServiceNodeState::VinSpent;
            return;
        }
        self.state = if !self.is_pinged_within(profile.removal_secs, now) {
            ServiceNodeState::Removed
        } else if !self.is_pinged_within(profile.expiration_secs, now) {
            ServiceNodeState::Expired
        } else {
            ServiceNodeState::Enabled
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crown_core::MemoryChain;
    use crown_cryptography::KeyPair;

    fn entry_at(sig_time: i64) -> (ServiceNodeEntry, KeyPair) {
        let node = KeyPair::generate();
        let broadcast = ServiceNodeBroadcast::create(
            OutPoint::new(UInt256::from_bytes([1u8; 32]), 0),
            "10.1.1.1:19340".parse().unwrap(),
            &KeyPair::generate(),
            &node,
            70092,
            sig_time,
            false,
        )
        .unwrap();
        (ServiceNodeEntry::from_broadcast(&broadcast), node)
    }

    #[test]
    fn test_ping_never_regresses() {
        let (mut entry, node) = entry_at(1_000);
        let older = ServiceNodePing::new_signed(entry.outpoint, 900, node.private_key()).unwrap();
        assert!(!entry.apply_ping(&older));
        assert_eq!(entry.last_ping_time(), 1_000);

        let newer = ServiceNodePing::new_signed(entry.outpoint, 1_400, node.private_key()).unwrap();
        assert!(entry.apply_ping(&newer));
        assert_eq!(entry.last_ping_time(), 1_400);
    }

    #[test]
    fn test_check_states() {
        let profile = RoleProfile::systemnode();
        let (mut entry, _) = entry_at(10_000);
        let chain = MemoryChain::new(100);
        chain.add_output(entry.outpoint, profile.collateral, 20);

        entry.check(10_000 + 60, &chain, &profile);
        assert_eq!(entry.state, ServiceNodeState::Enabled);

        entry.check(10_000 + profile.expiration_secs as i64 + 1, &chain, &profile);
        assert_eq!(entry.state, ServiceNodeState::Expired);

        entry.check(10_000 + profile.removal_secs as i64 + 1, &chain, &profile);
        assert_eq!(entry.state, ServiceNodeState::Removed);

        chain.spend(&entry.outpoint);
        entry.check(10_000, &chain, &profile);
        assert_eq!(entry.state, ServiceNodeState::VinSpent);
    }

    #[test]
    fn test_pinged_within_is_symmetric() {
        let (entry, _) = entry_at(5_000);
        assert!(entry.is_pinged_within(300, 5_299));
        assert!(!entry.is_pinged_within(300, 5_300));
        assert!(entry.is_pinged_within(300, 4_701));
    }

    #[test]
    fn test_round_trip_through_broadcast() {
        let (entry, _) = entry_at(7);
        assert_eq!(ServiceNodeEntry::from_broadcast(&entry.to_broadcast()), entry);
        assert_eq!(entry.state.to_string(), "ENABLED");
    }

    #[test]
    fn test_state_serializes_like_display() {
        let json = serde_json::to_string(&ServiceNodeState::VinSpent).unwrap();
        assert_eq!(json, "\"VIN_SPENT\"");
        let json = serde_json::to_string(&ServiceNodeState::Expired).unwrap();
        assert_eq!(json, "\"EXPIRED\"");
    }
}
