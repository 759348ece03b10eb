// Copyright (C) 2014-2026 The Crown Developers.
//
// daemon.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Composition root: wires chain view, wallet, transport, registries,
//! controllers, scheduler and router, then runs until interrupted.

use crate::config::NodeConfig;
use anyhow::{Context, Result};
use crown_config::Role;
use crown_core::{ChainView, Clock, MemoryChain, ShutdownSignal, SystemClock};
use crown_cryptography::KeyPair;
use crown_network::{accept_messages, TcpTransport, Transport};
use crown_servicenode::{
    ActiveContext, ActiveServiceNode, ActiveSettings, RoleDriver, ServiceNodeProtocol,
    ServiceNodeRegistry, ServiceNodeRouter, ServiceNodeSync, SyncScheduler, SyncTimings,
};
use crown_wallets::{MemoryWallet, WalletCoin};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};

const INBOUND_QUEUE_SIZE: usize = 1_000;

pub async fn run(config: NodeConfig) -> Result<()> {
    config.validate()?;

    let shutdown = ShutdownSignal::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let memory_chain = Arc::new(MemoryChain::new(0));
    let chain: Arc<dyn ChainView> = memory_chain.clone();
    let wallet = Arc::new(MemoryWallet::with_chain(chain.clone()));

    let magic = config.network.magic();
    let connect_timeout = Duration::from_millis(config.scheduler.connect_timeout_millis);
    let local_endpoint = config.listen_addr.filter(|addr| !addr.ip().is_unspecified());
    let tcp = Arc::new(TcpTransport::new(magic, local_endpoint, connect_timeout));
    tcp.maintain_connections(&config.peers);
    let transport: Arc<dyn Transport> = tcp.clone();

    let mut scheduler = SyncScheduler::new(chain.clone(), shutdown.clone())
        .with_period(Duration::from_millis(config.scheduler.tick_millis));
    let mut router = ServiceNodeRouter::new();

    for role in Role::ALL {
        let profile = config.profile(role);
        let settings = config.role(role);

        let registry = Arc::new(ServiceNodeRegistry::new(
            profile.clone(),
            chain.clone(),
            clock.clone(),
            config.scheduler.seen_cache_capacity,
        ));
        let sync = Arc::new(ServiceNodeSync::new(
            role_label(role),
            chain.clone(),
            clock.clone(),
            SyncTimings::default(),
        ));
        let protocol = Arc::new(ServiceNodeProtocol::new(
            registry.clone(),
            transport.clone(),
            config.network,
        ));
        router = router.with_role(protocol, Some(sync.clone()));

        let mut driver = RoleDriver::new(registry.clone(), sync.clone(), transport.clone());
        if settings.enabled {
            for collateral in &settings.collateral {
                let key = KeyPair::from_wif(&collateral.private_key, config.network)?;
                memory_chain.add_output(
                    collateral.outpoint,
                    profile.collateral,
                    collateral.confirmations,
                );
                wallet.add_coin(WalletCoin {
                    outpoint: collateral.outpoint,
                    value: profile.collateral,
                    confirmations: collateral.confirmations,
                    trusted: true,
                    key,
                })?;
            }

            let node_key = settings.node_key(role, config.network)?;
            info!(role = %role, node_pubkey = %node_key.public_key(), "Local {} enabled", role.display_name());
            let controller = ActiveServiceNode::new(
                profile,
                ActiveSettings {
                    network: config.network,
                    external_address: settings.external_address,
                    connect_timeout,
                    ..ActiveSettings::default()
                },
                node_key,
                ActiveContext {
                    wallet: wallet.clone(),
                    sync: sync.clone(),
                    transport: transport.clone(),
                    registry,
                    clock: clock.clone(),
                    shutdown: shutdown.clone(),
                },
            );
            driver = driver.with_controller(controller);
        }
        scheduler = scheduler.with_driver(driver);
    }

    let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE_SIZE);
    let listener_handle = match config.listen_addr {
        Some(addr) => {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            info!("Listening for service-node messages on {}", addr);
            Some(tokio::spawn(accept_messages(listener, magic, inbound_tx)))
        }
        None => {
            warn!("No listen address configured; inbound messages are disabled");
            drop(inbound_tx);
            None
        }
    };

    let router_handle = tokio::spawn(router.run(inbound_rx, shutdown.clone()));
    let scheduler_handle = tokio::spawn(scheduler.run());
    info!("✅ Crown service node started");

    wait_for_signal().await;
    shutdown.request("User requested shutdown");

    if let Some(handle) = listener_handle {
        handle.abort();
    }
    let (router_result, scheduler_result) = tokio::join!(router_handle, scheduler_handle);
    router_result.context("Router task failed")?;
    scheduler_result.context("Scheduler task failed")?;
    info!(relayed = tcp.relayed_count(), "✅ Crown service node stopped gracefully");
    Ok(())
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Masternode => "masternode",
        Role::Systemnode => "systemnode",
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    let mut term = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            let _ = signal::ctrl_c().await;
            info!("📶 Received shutdown signal (Ctrl+C)");
            return;
        }
    };
    tokio::select! {
        _ = signal::ctrl_c() => info!("📶 Received shutdown signal (Ctrl+C)"),
        _ = term.recv() => info!("📶 Received shutdown signal (SIGTERM)"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = signal::ctrl_c().await;
    info!("📶 Received shutdown signal (Ctrl+C)");
}
