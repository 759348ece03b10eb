// Copyright (C) 2014-2026 The Crown Developers.
//
// protocol_flow_tests.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Inbound broadcast and ping handling against a live registry.

mod common;

use common::{Harness, START};
use crown_config::{NetworkType, Role, PROTOCOL_VERSION};
use crown_core::{OutPoint, UInt256};
use crown_cryptography::{CompactSignature, KeyPair, COMPACT_SIGNATURE_SIZE};
use crown_network::{ServiceNodeBroadcast, ServiceNodeMessage, ServiceNodePing};
use crown_servicenode::*;
use proptest::prelude::*;

fn flip_signature_bit(sig: &CompactSignature, bit: usize) -> CompactSignature {
    let mut bytes = *sig.as_bytes();
    bytes[(bit / 8) % COMPACT_SIGNATURE_SIZE] ^= 1 << (bit % 8);
    CompactSignature::from_bytes(bytes)
}

fn remote_broadcast(h: &Harness, sig_time: i64) -> ServiceNodeBroadcast {
    ServiceNodeBroadcast::create(
        h.outpoint,
        "10.0.0.5:19999".parse().unwrap(),
        &h.collateral_key,
        &h.node_key,
        PROTOCOL_VERSION,
        sig_time,
        false,
    )
    .unwrap()
}

#[test]
fn test_duplicate_broadcast_is_a_no_op() {
    let h = Harness::systemnode();
    h.chain.add_output(h.outpoint, h.profile.collateral, 20);
    let protocol = h.protocol(NetworkType::TestNet);
    let broadcast = remote_broadcast(&h, START);

    assert_eq!(protocol.process_broadcast(&broadcast), Ok(ProcessOutcome::Added));
    let before = h.registry.entries();

    assert_eq!(protocol.process_broadcast(&broadcast), Ok(ProcessOutcome::Duplicate));
    assert_eq!(h.registry.entries(), before);
    assert_eq!(h.transport.relayed().len(), 1);
}

#[test]
fn test_replayed_broadcast_keeps_newer_ping() {
    let h = Harness::systemnode();
    h.chain.add_output(h.outpoint, h.profile.collateral, 20);
    let protocol = h.protocol(NetworkType::TestNet);
    let broadcast = remote_broadcast(&h, START);
    protocol.process_broadcast(&broadcast).unwrap();

    h.clock.advance(250);
    let ping = ServiceNodePing::new_signed(h.outpoint, START + 250, h.node_key.private_key())
        .unwrap();
    assert_eq!(protocol.process_ping(&ping), Ok(ProcessOutcome::Updated));

    // The replay is deduplicated and does not rewind the liveness timer.
    assert_eq!(protocol.process_broadcast(&broadcast), Ok(ProcessOutcome::Duplicate));
    assert_eq!(
        h.registry.find(&h.outpoint).unwrap().last_ping_time(),
        START + 250
    );

    // The cached copy now carries the newer ping.
    let cached = h.registry.seen_broadcast(&broadcast.hash()).unwrap();
    assert_eq!(cached.last_ping, Some(ping));

    // A newer announcement with an older embedded ping does not either.
    let renewed = remote_broadcast(&h, START + 100);
    assert_eq!(protocol.process_broadcast(&renewed), Ok(ProcessOutcome::Updated));
    let entry = h.registry.find(&h.outpoint).unwrap();
    assert_eq!(entry.sig_time, START + 100);
    assert_eq!(entry.last_ping_time(), START + 250);
    assert_eq!(h.transport.relayed().len(), 3);
}

#[test]
fn test_old_protocol_rejected() {
    let h = Harness::systemnode();
    h.chain.add_output(h.outpoint, h.profile.collateral, 20);
    let protocol = h.protocol(NetworkType::TestNet);
    let broadcast = ServiceNodeBroadcast::create(
        h.outpoint,
        "10.0.0.5:19999".parse().unwrap(),
        &h.collateral_key,
        &h.node_key,
        h.profile.min_protocol_version - 1,
        START,
        false,
    )
    .unwrap();

    assert_eq!(
        protocol.process_broadcast(&broadcast),
        Err(ProtocolError::ObsoleteProtocol {
            version: h.profile.min_protocol_version - 1,
            minimum: h.profile.min_protocol_version,
        })
    );
    assert!(h.registry.is_empty());
    assert!(h.transport.relayed().is_empty());
}

#[test]
fn test_router_feeds_both_roles() {
    let masternodes = Harness::new(crown_config::RoleProfile::masternode());
    let systemnodes = Harness::systemnode();
    masternodes
        .chain
        .add_output(masternodes.outpoint, masternodes.profile.collateral, 20);
    systemnodes
        .chain
        .add_output(systemnodes.outpoint, systemnodes.profile.collateral, 20);

    let router = ServiceNodeRouter::new()
        .with_role(
            std::sync::Arc::new(masternodes.protocol(NetworkType::TestNet)),
            None,
        )
        .with_role(
            std::sync::Arc::new(systemnodes.protocol(NetworkType::TestNet)),
            None,
        );

    let mnb = ServiceNodeMessage::Broadcast(Role::Masternode, remote_broadcast(&masternodes, START));
    let snb = ServiceNodeMessage::Broadcast(Role::Systemnode, remote_broadcast(&systemnodes, START));
    assert_eq!(router.dispatch(&mnb), Ok(ProcessOutcome::Added));
    assert_eq!(router.dispatch(&snb), Ok(ProcessOutcome::Added));
    assert_eq!(masternodes.registry.len(), 1);
    assert_eq!(systemnodes.registry.len(), 1);

    // A systemnode-sized output is not a masternode collateral.
    let small = OutPoint::new(UInt256::from_bytes([0x43; 32]), 0);
    masternodes
        .chain
        .add_output(small, systemnodes.profile.collateral, 20);
    let wrong = ServiceNodeBroadcast::create(
        small,
        "10.0.0.6:19999".parse().unwrap(),
        &KeyPair::generate(),
        &KeyPair::generate(),
        PROTOCOL_VERSION,
        START,
        false,
    )
    .unwrap();
    assert_eq!(
        router.dispatch(&ServiceNodeMessage::Broadcast(Role::Masternode, wrong)),
        Err(ProtocolError::CollateralValue {
            outpoint: small,
            expected: masternodes.profile.collateral,
            actual: systemnodes.profile.collateral,
        })
    );
    assert_eq!(masternodes.registry.len(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_ping_signature_binds_fields(
        sig_time in 0i64..4_000_000_000,
        txid in any::<[u8; 32]>(),
        index in any::<u32>(),
        bit in 8usize..520,
    ) {
        let key = KeyPair::generate();
        let outpoint = OutPoint::new(UInt256::from_bytes(txid), index);
        let ping = ServiceNodePing::new_signed(outpoint, sig_time, key.private_key()).unwrap();
        prop_assert!(ping.verify(key.public_key()).is_ok());

        let mut shifted = ping.clone();
        shifted.sig_time = sig_time + 1;
        prop_assert!(shifted.verify(key.public_key()).is_err());

        let mut tampered = ping.clone();
        tampered.signature = flip_signature_bit(&ping.signature, bit);
        prop_assert!(tampered.verify(key.public_key()).is_err());

        prop_assert!(ping.verify(KeyPair::generate().public_key()).is_err());
    }
}
