// Copyright (C) 2014-2026 The Crown Developers.
//
// config.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Node configuration management.
//!
//! The node reads an optional TOML file; command-line flags and their
//! environment fallbacks override individual values afterwards.

use anyhow::{bail, Context};
use crown_config::{
    NetworkType, Role, RoleProfile, COIN, DEFAULT_CONNECT_TIMEOUT_MILLIS,
    DEFAULT_SEEN_CACHE_CAPACITY, SCHEDULER_TICK_MILLIS,
};
use crown_core::OutPoint;
use crown_cryptography::KeyPair;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Complete node configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub network: NetworkType,
    /// P2P listen address for service-node messages
    pub listen_addr: Option<SocketAddr>,
    /// Peers that receive our relays from startup on
    pub peers: Vec<SocketAddr>,
    pub masternode: RoleConfig,
    pub systemnode: RoleConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

/// Per-role settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleConfig {
    /// Run the local node for this role
    pub enabled: bool,
    /// WIF-encoded node key
    pub private_key: Option<String>,
    /// Externally reachable service address
    pub external_address: Option<SocketAddr>,
    /// Collateral outputs this node controls
    pub collateral: Vec<CollateralConfig>,
    pub profile: ProfileOverrides,
}

/// A collateral output and the key that spends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollateralConfig {
    pub outpoint: OutPoint,
    /// WIF-encoded collateral key
    pub private_key: String,
    #[serde(default = "CollateralConfig::default_confirmations")]
    pub confirmations: u32,
}

impl CollateralConfig {
    fn default_confirmations() -> u32 {
        crown_config::SERVICE_NODE_MIN_CONFIRMATIONS
    }
}

/// Optional replacements for the built-in role constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverrides {
    /// Collateral in whole coins
    pub collateral_coins: Option<u64>,
    pub min_confirmations: Option<u32>,
    pub ping_interval_secs: Option<u64>,
    pub expiration_secs: Option<u64>,
    pub removal_secs: Option<u64>,
}

/// Scheduler and cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_millis: u64,
    pub connect_timeout_millis: u64,
    pub seen_cache_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_millis: SCHEDULER_TICK_MILLIS,
            connect_timeout_millis: DEFAULT_CONNECT_TIMEOUT_MILLIS,
            seen_cache_capacity: DEFAULT_SEEN_CACHE_CAPACITY,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error or a full
    /// `EnvFilter` expression)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl RoleConfig {
    pub fn node_key(&self, role: Role, network: NetworkType) -> anyhow::Result<KeyPair> {
        let wif = self
            .private_key
            .as_deref()
            .with_context(|| format!("{role} is enabled but no {role} private key is set"))?;
        KeyPair::from_wif(wif, network).with_context(|| format!("Invalid {role} private key"))
    }
}

impl NodeConfig {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn role(&self, role: Role) -> &RoleConfig {
        match role {
            Role::Masternode => &self.masternode,
            Role::Systemnode => &self.systemnode,
        }
    }

    pub fn role_mut(&mut self, role: Role) -> &mut RoleConfig {
        match role {
            Role::Masternode => &mut self.masternode,
            Role::Systemnode => &mut self.systemnode,
        }
    }

    /// Built-in profile for `role` with the file's overrides applied.
    pub fn profile(&self, role: Role) -> RoleProfile {
        let overrides = &self.role(role).profile;
        let mut profile = RoleProfile::for_role(role);
        if let Some(coins) = overrides.collateral_coins {
            profile.collateral = coins.saturating_mul(COIN);
        }
        if let Some(value) = overrides.min_confirmations {
            profile.min_confirmations = value;
        }
        if let Some(value) = overrides.ping_interval_secs {
            profile.ping_interval_secs = value;
        }
        if let Some(value) = overrides.expiration_secs {
            profile.expiration_secs = value;
        }
        if let Some(value) = overrides.removal_secs {
            profile.removal_secs = value;
        }
        profile
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scheduler.tick_millis == 0 {
            bail!("scheduler.tick_millis must be greater than 0");
        }
        if self.scheduler.connect_timeout_millis == 0 {
            bail!("scheduler.connect_timeout_millis must be greater than 0");
        }
        if self.scheduler.seen_cache_capacity == 0 {
            bail!("scheduler.seen_cache_capacity must be greater than 0");
        }

        for role in Role::ALL {
            let profile = self.profile(role);
            profile.validate()?;

            let settings = self.role(role);
            if !settings.enabled {
                continue;
            }
            settings.node_key(role, self.network)?;
            if let Some(address) = settings.external_address {
                profile.check_port(self.network, address.port())?;
            }
            for collateral in &settings.collateral {
                KeyPair::from_wif(&collateral.private_key, self.network).with_context(|| {
                    format!("Invalid collateral key for {}", collateral.outpoint)
                })?;
            }
        }
        Ok(())
    }
}
