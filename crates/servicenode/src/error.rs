// Copyright (C) 2014-2026 The Crown Developers.
//
// error.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Error types for the service-node layer.

use crown_config::{ConfigError, Role};
use crown_core::OutPoint;
use crown_cryptography::Error as CryptoError;
use std::net::SocketAddr;
use thiserror::Error;

/// Result type for controller operations
pub type Result<T> = std::result::Result<T, ServiceNodeError>;

/// Errors returned by the active controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceNodeError {
    #[error("{} is not in a running status", .0.display_name())]
    NotStarted(Role),

    #[error("Couldn't sign {} Ping: {source}", .role.display_name())]
    PingSigning { role: Role, source: CryptoError },

    #[error("Too early to send {} Ping", .0.display_name())]
    TooEarly(Role),

    /// Our entry vanished from the roster; the controller stops pinging.
    #[error("{reason}")]
    NotRegistered { reason: String },
}

/// Registry-side failures of the local ping path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Service node {0} is not in the list")]
    NotRegistered(OutPoint),

    #[error("Service node {0} was pinged too recently")]
    PingedTooRecently(OutPoint),
}

/// Reasons the controller cannot start. The display text is what the
/// status message reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("Wallet is locked.")]
    WalletLocked,

    #[error(
        "{} configured correctly and ready, please use your local wallet to start it.",
        .0.display_name()
    )]
    NoTrustedBalance(Role),

    #[error("Can't detect external address. Please use the {0}addr configuration option.")]
    NoExternalAddress(Role),

    #[error("{0}")]
    InvalidPort(#[from] ConfigError),

    #[error("Could not connect to {0}")]
    Unreachable(SocketAddr),

    #[error("Shutdown requested")]
    ShutdownRequested,

    #[error("Could not find suitable coins!")]
    NoSuitableCoins,

    #[error("{status} - {confirmations} confirmations")]
    InputTooNew { status: String, confirmations: u32 },

    #[error("Error on CreateBroadcast: {0}")]
    CreateBroadcast(CryptoError),
}

/// Why an inbound broadcast or ping was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Signature time {sig_time} is too far in the future (now {now})")]
    FromFuture { sig_time: i64, now: i64 },

    #[error("Signature time {sig_time} is too old (now {now})")]
    TooOld { sig_time: i64, now: i64 },

    #[error("Protocol version {version} is below the minimum {minimum}")]
    ObsoleteProtocol { version: u32, minimum: u32 },

    #[error("{0}")]
    InvalidPort(#[from] ConfigError),

    #[error("Bad broadcast signature: {0}")]
    InvalidSignature(CryptoError),

    #[error("Bad ping signature: {0}")]
    InvalidPingSignature(CryptoError),

    #[error("Embedded ping refers to {ping} instead of {broadcast}")]
    PingMismatch { broadcast: OutPoint, ping: OutPoint },

    #[error("Unknown service node {0}")]
    UnknownServiceNode(OutPoint),

    #[error("Collateral {0} not found in the UTXO set")]
    CollateralNotFound(OutPoint),

    #[error("Collateral {outpoint} has value {actual}, expected {expected}")]
    CollateralValue {
        outpoint: OutPoint,
        expected: u64,
        actual: u64,
    },

    #[error("Collateral {outpoint} has {confirmations} confirmations, needs {required}")]
    CollateralTooNew {
        outpoint: OutPoint,
        confirmations: u32,
        required: u32,
    },

    #[error("Collateral key does not match the registered one for {0}")]
    CollateralKeyMismatch(OutPoint),

    #[error("Service node {0} pinged too recently")]
    PingTooEarly(OutPoint),

    #[error("{0} messages are not handled by this node")]
    RoleDisabled(Role),
}
