// Copyright (C) 2014-2026 The Crown Developers.
//
// mod.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Shared fixture: one role wired to in-memory collaborators.

#![allow(dead_code)]

use crown_config::{NetworkType, RoleProfile, DEFAULT_SEEN_CACHE_CAPACITY};
use crown_core::{ManualClock, MemoryChain, OutPoint, ShutdownSignal, UInt256};
use crown_cryptography::KeyPair;
use crown_network::RecordingTransport;
use crown_servicenode::*;
use crown_wallets::{MemoryWallet, WalletCoin};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const START: i64 = 1_700_000_000;

pub struct Harness {
    pub profile: RoleProfile,
    pub chain: Arc<MemoryChain>,
    pub clock: Arc<ManualClock>,
    pub wallet: Arc<MemoryWallet>,
    pub sync: Arc<ScriptedSync>,
    pub transport: Arc<RecordingTransport>,
    pub registry: Arc<ServiceNodeRegistry>,
    pub shutdown: ShutdownSignal,
    pub node_key: KeyPair,
    pub collateral_key: KeyPair,
    pub outpoint: OutPoint,
}

impl Harness {
    pub fn new(profile: RoleProfile) -> Self {
        let chain = Arc::new(MemoryChain::new(1_000));
        let clock = Arc::new(ManualClock::new(START));
        let registry = Arc::new(ServiceNodeRegistry::new(
            profile.clone(),
            chain.clone(),
            clock.clone(),
            DEFAULT_SEEN_CACHE_CAPACITY,
        ));
        Self {
            profile,
            wallet: Arc::new(MemoryWallet::with_chain(chain.clone())),
            chain,
            clock,
            sync: Arc::new(ScriptedSync::synced()),
            transport: Arc::new(RecordingTransport::reachable()),
            registry,
            shutdown: ShutdownSignal::new(),
            node_key: KeyPair::generate(),
            collateral_key: KeyPair::generate(),
            outpoint: OutPoint::new(UInt256::from_bytes([0x42; 32]), 0),
        }
    }

    pub fn systemnode() -> Self {
        Self::new(RoleProfile::systemnode())
    }

    /// Puts the collateral output into the wallet and on chain.
    pub fn fund(&self, confirmations: u32) {
        self.chain
            .add_output(self.outpoint, self.profile.collateral, confirmations);
        self.wallet
            .add_coin(WalletCoin {
                outpoint: self.outpoint,
                value: self.profile.collateral,
                confirmations,
                trusted: true,
                key: self.collateral_key.clone(),
            })
            .unwrap();
    }

    pub fn settings(&self, network: NetworkType, external: &str) -> ActiveSettings {
        ActiveSettings {
            network,
            external_address: Some(external.parse::<SocketAddr>().unwrap()),
            connect_timeout: Duration::from_millis(200),
            ..ActiveSettings::default()
        }
    }

    pub fn controller(&self, settings: ActiveSettings) -> ActiveServiceNode {
        ActiveServiceNode::new(
            self.profile.clone(),
            settings,
            self.node_key.clone(),
            ActiveContext {
                wallet: self.wallet.clone(),
                sync: self.sync.clone(),
                transport: self.transport.clone(),
                registry: self.registry.clone(),
                clock: self.clock.clone(),
                shutdown: self.shutdown.clone(),
            },
        )
    }

    /// Controller for a funded testnet node on a non-default port.
    pub fn testnet_controller(&self) -> ActiveServiceNode {
        self.controller(self.settings(NetworkType::TestNet, "10.0.0.1:19999"))
    }

    pub fn protocol(&self, network: NetworkType) -> ServiceNodeProtocol {
        ServiceNodeProtocol::new(self.registry.clone(), self.transport.clone(), network)
    }
}
