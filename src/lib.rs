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

//! # Crown-RS: Crown service-node liveness in Rust
//!
//! Masternodes and systemnodes prove that they are online by announcing
//! themselves once with a broadcast signed by their collateral key and then
//! pinging periodically with their node key. This library bundles the
//! crates that implement that layer:
//!
//! - [`crown_config`] - network types, role profiles and protocol constants
//! - [`crown_core`] - hashes, outpoints, clock, chain view, shutdown
//! - [`crown_io`] - canonical binary encoding
//! - [`crown_cryptography`] - hashing, keys and compact signatures
//! - [`crown_wallets`] - collateral wallet interface
//! - [`crown_network`] - broadcast/ping messages and transport
//! - [`crown_servicenode`] - registry, protocol, controller and scheduler

#![warn(rustdoc::missing_crate_level_docs)]

pub use crown_config as config;
pub use crown_core as core;
pub use crown_cryptography as crypto;
pub use crown_io as io;
pub use crown_network as network;
pub use crown_servicenode as servicenode;
pub use crown_wallets as wallets;

/// Common imports for service-node development
pub mod prelude {
    pub use crate::config::{NetworkType, Role, RoleProfile};
    pub use crate::core::{ChainView, Clock, OutPoint, ShutdownSignal, UInt160, UInt256};
    pub use crate::crypto::{CompactSignature, HashSigner, KeyPair, PrivateKey, PublicKey};
    pub use crate::network::{
        ServiceNodeBroadcast, ServiceNodeMessage, ServiceNodePing, SyncOracle, Transport,
    };
    pub use crate::servicenode::{
        ActiveServiceNode, ActiveStatus, ServiceNodeProtocol, ServiceNodeRegistry, SyncScheduler,
    };
    pub use crate::wallets::Wallet;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
