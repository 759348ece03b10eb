// Copyright (C) 2014-2026 The Crown Developers.
//
// main.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Crown service node daemon
//!
//! Tracks the masternode and systemnode rosters, relays broadcasts and
//! pings, and optionally runs a local masternode and/or systemnode.

use anyhow::{Context, Result};
use clap::Parser;
use crown_config::{NetworkType, Role};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};

mod config;
mod daemon;
mod logging;

use config::{LogFormat, NodeConfig};

/// Crown service node daemon
#[derive(Parser, Debug)]
#[command(name = "crown-node", author, version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "CROWN_CONFIG")]
    config: Option<PathBuf>,

    /// Network to join (mainnet, testnet, regtest)
    #[arg(long, env = "CROWN_NETWORK")]
    network: Option<NetworkType>,

    /// Address to accept service-node messages on
    #[arg(long, env = "CROWN_LISTEN")]
    listen: Option<SocketAddr>,

    /// Peers to relay to (comma-separated)
    #[arg(long, value_delimiter = ',', env = "CROWN_PEERS")]
    peers: Vec<SocketAddr>,

    /// Run a local masternode
    #[arg(long, env = "CROWN_MASTERNODE")]
    masternode: bool,

    /// WIF node key of the local masternode
    #[arg(long, env = "CROWN_MASTERNODE_PRIVKEY", hide_env_values = true)]
    masternodeprivkey: Option<String>,

    /// External address of the local masternode
    #[arg(long, env = "CROWN_MASTERNODEADDR")]
    masternodeaddr: Option<SocketAddr>,

    /// Run a local systemnode
    #[arg(long, env = "CROWN_SYSTEMNODE")]
    systemnode: bool,

    /// WIF node key of the local systemnode
    #[arg(long, env = "CROWN_SYSTEMNODE_PRIVKEY", hide_env_values = true)]
    systemnodeprivkey: Option<String>,

    /// External address of the local systemnode
    #[arg(long, env = "CROWN_SYSTEMNODEADDR")]
    systemnodeaddr: Option<SocketAddr>,

    /// Log filter (e.g. info, debug, crown_servicenode=trace)
    #[arg(long, env = "CROWN_LOG")]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, env = "CROWN_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Inbound connectivity probe timeout
    #[arg(long, env = "CROWN_CONNECT_TIMEOUT_MS")]
    connect_timeout_ms: Option<u64>,

    /// Bound on each seen-message cache
    #[arg(long, env = "CROWN_SEEN_CACHE_CAPACITY")]
    seen_cache_capacity: Option<usize>,

    /// Scheduler period
    #[arg(long, env = "CROWN_TICK_MS")]
    tick_ms: Option<u64>,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,
}

impl Cli {
    /// File values first, then flags.
    fn resolve(&self) -> Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::load_from_file(path)?,
            None => NodeConfig::default(),
        };

        if let Some(network) = self.network {
            config.network = network;
        }
        if self.listen.is_some() {
            config.listen_addr = self.listen;
        }
        if !self.peers.is_empty() {
            config.peers = self.peers.clone();
        }

        let roles = [
            (Role::Masternode, self.masternode, &self.masternodeprivkey, self.masternodeaddr),
            (Role::Systemnode, self.systemnode, &self.systemnodeprivkey, self.systemnodeaddr),
        ];
        for (role, enabled, key, address) in roles {
            let settings = config.role_mut(role);
            settings.enabled |= enabled;
            if key.is_some() {
                settings.private_key = key.clone();
            }
            if address.is_some() {
                settings.external_address = address;
            }
        }

        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.scheduler.connect_timeout_millis = timeout;
        }
        if let Some(capacity) = self.seen_cache_capacity {
            config.scheduler.seen_cache_capacity = capacity;
        }
        if let Some(tick) = self.tick_ms {
            config.scheduler.tick_millis = tick;
        }
        Ok(config)
    }
}

/// What `--check-config` prints: the resolved network and, per role, the
/// profile in effect after overrides.
fn effective_summary(config: &NodeConfig) -> serde_json::Value {
    let roles: Vec<_> = Role::ALL
        .into_iter()
        .map(|role| {
            let settings = config.role(role);
            serde_json::json!({
                "role": role,
                "enabled": settings.enabled,
                "external_address": settings.external_address,
                "collateral_outputs": settings.collateral.len(),
                "profile": config.profile(role),
            })
        })
        .collect();
    serde_json::json!({
        "network": config.network,
        "listen_addr": config.listen_addr,
        "peers": config.peers,
        "roles": roles,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve()?;
    logging::init(&config.logging).context("Failed to initialise logging")?;

    if cli.check_config {
        config.validate()?;
        println!("{}", serde_json::to_string_pretty(&effective_summary(&config))?);
        return Ok(());
    }

    info!("🚀 Starting Crown service node ({:?})", config.network);
    if let Err(e) = daemon::run(config).await {
        error!("❌ Node failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
