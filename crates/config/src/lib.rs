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

//! Crown Configuration Module
//!
//! Network parameters, protocol constants and the per-role profiles that
//! parameterise the service-node machinery. Both service-node roles share
//! one state machine; everything that differs between them lives in a
//! [`RoleProfile`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Satoshi-style base units per coin
pub const COIN: u64 = 100_000_000;

/// Size of a hash (UInt256) in bytes
pub const HASH_SIZE: usize = 32;
/// Size of a key id (UInt160) in bytes
pub const ADDRESS_SIZE: usize = 20;

/// Protocol version spoken by this implementation
pub const PROTOCOL_VERSION: u32 = 70092;
/// Oldest peer protocol version accepted for service-node messages
pub const MIN_SERVICE_NODE_PROTOCOL_VERSION: u32 = 70091;

/// Default P2P ports
pub const MAINNET_DEFAULT_PORT: u16 = 9340;
pub const TESTNET_DEFAULT_PORT: u16 = 19340;
pub const REGTEST_DEFAULT_PORT: u16 = 19445;

/// Service-node timing constants (seconds)
pub const SERVICE_NODE_PING_SECONDS: u64 = 5 * 60;
pub const SERVICE_NODE_EXPIRATION_SECONDS: u64 = 65 * 60;
pub const SERVICE_NODE_REMOVAL_SECONDS: u64 = 75 * 60;
pub const SERVICE_NODE_MIN_CONFIRMATIONS: u32 = 15;

/// A signed message may not claim a signing time further ahead than this.
pub const MAX_FUTURE_DRIFT_SECONDS: i64 = 60 * 60;
/// Pings older than this are rejected on receipt.
pub const MAX_PING_AGE_SECONDS: i64 = 60 * 60;

/// Scheduler cadence
pub const SCHEDULER_TICK_MILLIS: u64 = 1_000;
pub const HOUSEKEEPING_INTERVAL_TICKS: u64 = 60;
pub const MANAGE_STATUS_PHASE_TICKS: u64 = 15;

/// Default bound on each seen-message cache
pub const DEFAULT_SEEN_CACHE_CAPACITY: usize = 10_000;
/// Default timeout of the inbound connectivity probe
pub const DEFAULT_CONNECT_TIMEOUT_MILLIS: u64 = 5_000;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid port: {port} - only {default_port} is supported on mainnet.")]
    MainnetPortRequired { port: u16, default_port: u16 },

    #[error("Invalid port: {port} - {default_port} is only supported on mainnet.")]
    MainnetPortReserved { port: u16, default_port: u16 },

    #[error("Unknown network type: {0}")]
    UnknownNetwork(String),

    #[error("Unknown service node role: {0}")]
    UnknownRole(String),

    #[error("Invalid role profile for {role}: {reason}")]
    InvalidProfile { role: Role, reason: String },
}

/// Network type for the Crown blockchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    #[default]
    MainNet,
    TestNet,
    RegTest,
}

impl NetworkType {
    /// Gets the network magic number
    pub fn magic(&self) -> u32 {
        match self {
            NetworkType::MainNet => 0xb8ebb3df,
            NetworkType::TestNet => 0x0f180e06,
            NetworkType::RegTest => 0xfabfb5da,
        }
    }

    /// Default P2P port of this network
    pub fn default_port(&self) -> u16 {
        match self {
            NetworkType::MainNet => MAINNET_DEFAULT_PORT,
            NetworkType::TestNet => TESTNET_DEFAULT_PORT,
            NetworkType::RegTest => REGTEST_DEFAULT_PORT,
        }
    }

    /// Prefix byte of WIF-encoded secret keys
    pub fn secret_key_prefix(&self) -> u8 {
        match self {
            NetworkType::MainNet => 0x80,
            NetworkType::TestNet | NetworkType::RegTest => 0xef,
        }
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self, NetworkType::MainNet)
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkType::MainNet => write!(f, "mainnet"),
            NetworkType::TestNet => write!(f, "testnet"),
            NetworkType::RegTest => write!(f, "regtest"),
        }
    }
}

impl FromStr for NetworkType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(NetworkType::MainNet),
            "testnet" | "test" => Ok(NetworkType::TestNet),
            "regtest" | "reg" | "private" => Ok(NetworkType::RegTest),
            _ => Err(ConfigError::UnknownNetwork(s.to_string())),
        }
    }
}

/// Service node roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Masternode,
    Systemnode,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Masternode, Role::Systemnode];

    /// Capitalised name used in status texts
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Masternode => "Masternode",
            Role::Systemnode => "Systemnode",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Masternode => write!(f, "masternode"),
            Role::Systemnode => write!(f, "systemnode"),
        }
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "masternode" | "mn" => Ok(Role::Masternode),
            "systemnode" | "sn" => Ok(Role::Systemnode),
            _ => Err(ConfigError::UnknownRole(s.to_string())),
        }
    }
}

/// Everything that differs between the two service-node roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProfile {
    pub role: Role,
    /// Exact value of the collateral output, in base units
    pub collateral: u64,
    pub min_confirmations: u32,
    pub ping_interval_secs: u64,
    /// Canonical service port on mainnet
    pub default_port: u16,
    pub min_protocol_version: u32,
    pub expiration_secs: u64,
    pub removal_secs: u64,
}

impl RoleProfile {
    pub fn masternode() -> Self {
        Self {
            role: Role::Masternode,
            collateral: 10_000 * COIN,
            min_confirmations: SERVICE_NODE_MIN_CONFIRMATIONS,
            ping_interval_secs: SERVICE_NODE_PING_SECONDS,
            default_port: MAINNET_DEFAULT_PORT,
            min_protocol_version: MIN_SERVICE_NODE_PROTOCOL_VERSION,
            expiration_secs: SERVICE_NODE_EXPIRATION_SECONDS,
            removal_secs: SERVICE_NODE_REMOVAL_SECONDS,
        }
    }

    pub fn systemnode() -> Self {
        Self {
            role: Role::Systemnode,
            collateral: 500 * COIN,
            ..Self::masternode()
        }
    }

    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Masternode => Self::masternode(),
            Role::Systemnode => Self::systemnode(),
        }
    }

    /// On mainnet the service must listen on the canonical port; anywhere
    /// else it must not.
    pub fn check_port(&self, network: NetworkType, port: u16) -> Result<(), ConfigError> {
        if network.is_mainnet() {
            if port != self.default_port {
                return Err(ConfigError::MainnetPortRequired {
                    port,
                    default_port: self.default_port,
                });
            }
        } else if port == self.default_port {
            return Err(ConfigError::MainnetPortReserved {
                port,
                default_port: self.default_port,
            });
        }
        Ok(())
    }

    /// Sanity checks applied to profiles loaded from configuration files.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidProfile {
            role: self.role,
            reason: reason.to_string(),
        };
        if self.collateral == 0 {
            return Err(invalid("collateral must be positive"));
        }
        if self.ping_interval_secs <= MANAGE_STATUS_PHASE_TICKS {
            return Err(invalid("ping interval must exceed the status phase offset"));
        }
        if self.expiration_secs <= self.ping_interval_secs {
            return Err(invalid("expiration must exceed the ping interval"));
        }
        if self.removal_secs < self.expiration_secs {
            return Err(invalid("removal must not precede expiration"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_matrix() {
        let profile = RoleProfile::systemnode();
        let default = profile.default_port;

        assert!(profile.check_port(NetworkType::MainNet, default).is_ok());
        assert_eq!(
            profile.check_port(NetworkType::MainNet, 12345),
            Err(ConfigError::MainnetPortRequired {
                port: 12345,
                default_port: default
            })
        );
        assert_eq!(
            profile.check_port(NetworkType::TestNet, default),
            Err(ConfigError::MainnetPortReserved {
                port: default,
                default_port: default
            })
        );
        assert!(profile.check_port(NetworkType::TestNet, 12345).is_ok());
        assert!(profile.check_port(NetworkType::RegTest, 19445).is_ok());
    }

    #[test]
    fn test_port_error_text() {
        let err = RoleProfile::masternode()
            .check_port(NetworkType::MainNet, 1)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid port: 1 - only 9340 is supported on mainnet."
        );
    }

    #[test]
    fn test_profiles_differ_only_in_collateral() {
        let mn = RoleProfile::masternode();
        let sn = RoleProfile::systemnode();
        assert_ne!(mn.collateral, sn.collateral);
        assert_eq!(mn.ping_interval_secs, sn.ping_interval_secs);
        assert!(mn.validate().is_ok());
        assert!(sn.validate().is_ok());
    }

    #[test]
    fn test_invalid_profile() {
        let mut profile = RoleProfile::masternode();
        profile.ping_interval_secs = 10;
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::InvalidProfile { .. })
        ));
    }
}
