// Copyright (C) 2014-2026 The Crown Developers.
//
// active.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! The local service node.
//!
//! [`ActiveServiceNode`] decides whether this process can run as a
//! masternode or systemnode and, once it does, keeps its roster entry alive
//! with periodic pings. It is driven exclusively by the scheduler, which
//! owns it and calls [`ActiveServiceNode::manage_status`] on the role's
//! phase tick.
//!
//! Status transitions:
//!
//! ```text
//! Initial -> SyncInProgress -> Initial -> NotCapable | InputTooNew | Started
//! ```
//!
//! `Started` is sticky. The only way back is the ping path discovering
//! that our entry disappeared from the roster.

use crate::entry::ServiceNodeState;
use crate::error::{RegistryError, Result, ServiceNodeError, StartError};
use crate::registry::ServiceNodeRegistry;
use crown_config::{NetworkType, Role, RoleProfile, DEFAULT_CONNECT_TIMEOUT_MILLIS, PROTOCOL_VERSION};
use crown_core::{Clock, OutPoint, ShutdownSignal};
use crown_cryptography::{CompactSignature, HashSigner, KeyPair};
use crown_network::{ServiceNodeBroadcast, ServiceNodeMessage, ServiceNodePing, SyncOracle, Transport};
use crown_wallets::Wallet;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveStatus {
    Initial,
    SyncInProgress,
    InputTooNew,
    NotCapable,
    Started,
}

/// Operator settings for the local node.
#[derive(Debug, Clone)]
pub struct ActiveSettings {
    pub network: NetworkType,
    /// Configured service address; auto-detected from the transport when
    /// unset.
    pub external_address: Option<SocketAddr>,
    pub connect_timeout: Duration,
    pub protocol_version: u32,
}

impl Default for ActiveSettings {
    fn default() -> Self {
        Self {
            network: NetworkType::default(),
            external_address: None,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MILLIS),
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

/// Collaborators the controller works through.
pub struct ActiveContext {
    pub wallet: Arc<dyn Wallet>,
    pub sync: Arc<dyn SyncOracle>,
    pub transport: Arc<dyn Transport>,
    pub registry: Arc<ServiceNodeRegistry>,
    pub clock: Arc<dyn Clock>,
    pub shutdown: ShutdownSignal,
}

pub struct ActiveServiceNode {
    profile: RoleProfile,
    settings: ActiveSettings,
    node_key: KeyPair,
    ctx: ActiveContext,

    status: ActiveStatus,
    not_capable_reason: String,
    collateral: Option<OutPoint>,
    service: Option<SocketAddr>,
    signover: Option<CompactSignature>,
}

impl ActiveServiceNode {
    pub fn new(
        profile: RoleProfile,
        settings: ActiveSettings,
        node_key: KeyPair,
        ctx: ActiveContext,
    ) -> Self {
        Self {
            profile,
            settings,
            node_key,
            ctx,
            status: ActiveStatus::Initial,
            not_capable_reason: String::new(),
            collateral: None,
            service: None,
            signover: None,
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn status(&self) -> ActiveStatus {
        self.status
    }

    pub fn not_capable_reason(&self) -> &str {
        &self.not_capable_reason
    }

    pub fn collateral(&self) -> Option<OutPoint> {
        self.collateral
    }

    pub fn service(&self) -> Option<SocketAddr> {
        self.service
    }

    pub fn signover(&self) -> Option<&CompactSignature> {
        self.signover.as_ref()
    }

    pub fn node_key(&self) -> &KeyPair {
        &self.node_key
    }

    /// One controller step.
    pub async fn manage_status(&mut self) {
        if !self.ctx.sync.is_blockchain_synced() || !self.ctx.sync.is_roster_synced() {
            self.status = ActiveStatus::SyncInProgress;
            info!(role = %self.role(), "{}", self.status_message());
            return;
        }

        if self.status == ActiveStatus::SyncInProgress {
            self.status = ActiveStatus::Initial;
        }

        if self.status == ActiveStatus::Initial {
            self.try_enable_from_roster();
        }

        if self.status != ActiveStatus::Started {
            match self.register().await {
                Ok(()) => {}
                Err(StartError::ShutdownRequested) => {
                    debug!(role = %self.role(), "Shutdown requested, activation abandoned");
                }
                Err(e) => {
                    self.status = match e {
                        StartError::InputTooNew { .. } => ActiveStatus::InputTooNew,
                        _ => ActiveStatus::NotCapable,
                    };
                    self.not_capable_reason = e.to_string();
                    info!(role = %self.role(), "Not capable: {}", self.not_capable_reason);
                }
            }
            return;
        }

        if let Err(e) = self.send_ping() {
            info!(role = %self.role(), "Error on Ping: {}", e);
        }
    }

    /// Hot/cold start: the collateral wallet lives elsewhere and already
    /// announced our node key.
    fn try_enable_from_roster(&mut self) {
        let Some(entry) = self.ctx.registry.find_by_pubkey(self.node_key.public_key()) else {
            return;
        };
        let enabled = self.ctx.registry.check_entry(&entry.outpoint) == Some(ServiceNodeState::Enabled);
        if !enabled || entry.protocol_version != self.settings.protocol_version {
            return;
        }

        self.enable_hot_cold(entry.outpoint, entry.addr);
        match entry.signover {
            Some(signover) => {
                match HashSigner::verify_pubkey(
                    &self.node_key.public_key().hash(),
                    &signover,
                    &entry.collateral_pubkey,
                ) {
                    Ok(()) => {
                        info!(role = %self.role(), "Verified node key signover for staking");
                        self.signover = Some(signover);
                    }
                    Err(e) => warn!(role = %self.role(), "Failed to verify signover: {}", e),
                }
            }
            None => debug!(role = %self.role(), "Roster entry carries no signover"),
        }
    }

    fn enable_hot_cold(&mut self, outpoint: OutPoint, service: SocketAddr) {
        self.status = ActiveStatus::Started;
        self.collateral = Some(outpoint);
        self.service = Some(service);
        info!(
            role = %self.role(),
            outpoint = %outpoint,
            "Enabled! You may shut down the cold daemon."
        );
    }

    /// Runs the capability checks in order and announces the node on
    /// success.
    async fn register(&mut self) -> std::result::Result<(), StartError> {
        let wallet = self.ctx.wallet.clone();
        if wallet.is_locked() {
            return Err(StartError::WalletLocked);
        }
        if wallet.trusted_balance() == 0 {
            return Err(StartError::NoTrustedBalance(self.role()));
        }

        let service = self
            .settings
            .external_address
            .or_else(|| self.ctx.transport.local_endpoint())
            .ok_or(StartError::NoExternalAddress(self.role()))?;
        self.profile
            .check_port(self.settings.network, service.port())?;

        info!(role = %self.role(), "Checking inbound connection to '{}'", service);
        if !self.probe(service).await? {
            return Err(StartError::Unreachable(service));
        }
        self.service = Some(service);

        // A reservation from an earlier registration is ours to reuse.
        let collateral = wallet
            .select_and_lock_collateral(self.profile.collateral, self.collateral.as_ref())
            .ok_or(StartError::NoSuitableCoins)?;
        self.collateral = Some(collateral.outpoint);

        let confirmations = wallet.confirmations(&collateral.outpoint);
        if confirmations < self.profile.min_confirmations {
            wallet.unlock_output(&collateral.outpoint);
            self.status = ActiveStatus::InputTooNew;
            return Err(StartError::InputTooNew {
                status: self.status_message(),
                confirmations,
            });
        }

        let broadcast = ServiceNodeBroadcast::create(
            collateral.outpoint,
            service,
            &collateral.key,
            &self.node_key,
            self.settings.protocol_version,
            self.ctx.clock.now(),
            true,
        )
        .map_err(StartError::CreateBroadcast)?;

        info!(role = %self.role(), "Update {} List", self.role().display_name());
        self.ctx.registry.update_from_broadcast(&broadcast);

        info!(role = %self.role(), outpoint = %collateral.outpoint, "Relay broadcast");
        self.signover = broadcast.signover;
        self.ctx
            .transport
            .relay(&ServiceNodeMessage::Broadcast(self.role(), broadcast));

        info!(role = %self.role(), "Is capable {}!", self.role().display_name());
        self.status = ActiveStatus::Started;
        Ok(())
    }

    /// Inbound connectivity check, abandoned when shutdown is requested.
    async fn probe(&self, service: SocketAddr) -> std::result::Result<bool, StartError> {
        if self.ctx.shutdown.is_requested() {
            return Err(StartError::ShutdownRequested);
        }
        let connect_timeout = self.settings.connect_timeout;
        tokio::select! {
            reachable = tokio::time::timeout(
                connect_timeout,
                self.ctx.transport.connect(service, connect_timeout),
            ) => Ok(reachable.unwrap_or(false)),
            _ = self.ctx.shutdown.wait() => Err(StartError::ShutdownRequested),
        }
    }

    /// Signs and relays a fresh ping for our collateral.
    pub fn send_ping(&mut self) -> Result<()> {
        let role = self.role();
        let collateral = match (self.status, self.collateral) {
            (ActiveStatus::Started, Some(collateral)) => collateral,
            _ => return Err(ServiceNodeError::NotStarted(role)),
        };

        let ping = ServiceNodePing::new_signed(
            collateral,
            self.ctx.clock.now(),
            self.node_key.private_key(),
        )
        .map_err(|source| ServiceNodeError::PingSigning { role, source })?;

        match self.ctx.registry.record_local_ping(&ping) {
            Ok(()) => {}
            Err(RegistryError::PingedTooRecently(_)) => {
                return Err(ServiceNodeError::TooEarly(role));
            }
            Err(RegistryError::NotRegistered(_)) => {
                let reason = format!(
                    "{name} List doesn't include our {name}, shutting down {name} pinging service! {collateral}",
                    name = role.display_name()
                );
                self.status = ActiveStatus::NotCapable;
                self.not_capable_reason = reason.clone();
                return Err(ServiceNodeError::NotRegistered { reason });
            }
        }

        info!(role = %role, outpoint = %collateral, "Relay {} Ping", role.display_name());
        self.ctx
            .transport
            .relay(&ServiceNodeMessage::Ping(role, ping));
        Ok(())
    }

    /// Human-readable status for RPC and logs.
    pub fn status_message(&self) -> String {
        let name = self.role().display_name();
        match self.status {
            ActiveStatus::Initial => "Node just started, not yet activated".to_string(),
            ActiveStatus::SyncInProgress => {
                format!("Sync in progress. Must wait until sync is complete to start {name}")
            }
            ActiveStatus::InputTooNew => format!(
                "{name} input must have at least {} confirmations",
                self.profile.min_confirmations
            ),
            ActiveStatus::NotCapable => {
                format!("Not capable {}: {}", self.role(), self.not_capable_reason)
            }
            ActiveStatus::Started => format!("{name} successfully started"),
        }
    }
}
