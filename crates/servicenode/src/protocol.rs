// Copyright (C) 2014-2026 The Crown Developers.
//
// protocol.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Receive path of the broadcast/ping protocol.
//!
//! Checks run in a fixed order and the first failure rejects the message.
//! Replays are recognised by their hash before any verification work and
//! are dropped without touching the roster. Accepted messages are relayed
//! after the registry lock has been released.

use crate::entry::{ServiceNodeEntry, ServiceNodeState};
use crate::error::ProtocolError;
use crate::registry::ServiceNodeRegistry;
use crown_config::{NetworkType, MAX_FUTURE_DRIFT_SECONDS, MAX_PING_AGE_SECONDS};
use crown_network::{ServiceNodeBroadcast, ServiceNodeMessage, ServiceNodePing, Transport};
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Slack granted to remote pings relative to the ping interval.
pub const PING_FLOOD_SLACK_SECONDS: u64 = 60;

pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// What happened to an inbound message that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// New identity added to the roster.
    Added,
    /// Existing entry refreshed.
    Updated,
    /// Already seen; nothing changed.
    Duplicate,
    /// Valid but not newer than what we have.
    Stale,
}

impl ProcessOutcome {
    pub fn is_relayed(&self) -> bool {
        matches!(self, ProcessOutcome::Added | ProcessOutcome::Updated)
    }
}

/// Validates inbound messages for one role and applies them to its
/// registry.
pub struct ServiceNodeProtocol {
    registry: Arc<ServiceNodeRegistry>,
    transport: Arc<dyn Transport>,
    network: NetworkType,
}

impl ServiceNodeProtocol {
    pub fn new(
        registry: Arc<ServiceNodeRegistry>,
        transport: Arc<dyn Transport>,
        network: NetworkType,
    ) -> Self {
        Self {
            registry,
            transport,
            network,
        }
    }

    pub fn registry(&self) -> &Arc<ServiceNodeRegistry> {
        &self.registry
    }

    pub fn process_broadcast(
        &self,
        broadcast: &ServiceNodeBroadcast,
    ) -> ProtocolResult<ProcessOutcome> {
        let hash = broadcast.hash();
        if self.registry.has_seen_broadcast(&hash) {
            debug!(outpoint = %broadcast.outpoint, "Ignoring known broadcast {}", hash);
            return Ok(ProcessOutcome::Duplicate);
        }

        let outcome = self.validate_and_apply_broadcast(broadcast);
        match &outcome {
            Ok(outcome) if outcome.is_relayed() => {
                self.transport.relay(&ServiceNodeMessage::Broadcast(
                    self.registry.role(),
                    broadcast.clone(),
                ));
            }
            Ok(_) => {}
            Err(e) => warn!(
                role = %self.registry.role(),
                outpoint = %broadcast.outpoint,
                "Rejected broadcast: {}",
                e
            ),
        }
        outcome
    }

    fn validate_and_apply_broadcast(
        &self,
        broadcast: &ServiceNodeBroadcast,
    ) -> ProtocolResult<ProcessOutcome> {
        let profile = self.registry.profile();
        let now = self.registry.now();

        if broadcast.sig_time > now + MAX_FUTURE_DRIFT_SECONDS {
            return Err(ProtocolError::FromFuture {
                sig_time: broadcast.sig_time,
                now,
            });
        }
        if broadcast.protocol_version < profile.min_protocol_version {
            return Err(ProtocolError::ObsoleteProtocol {
                version: broadcast.protocol_version,
                minimum: profile.min_protocol_version,
            });
        }
        profile.check_port(self.network, broadcast.addr.port())?;
        broadcast
            .verify_signature()
            .map_err(ProtocolError::InvalidSignature)?;
        if let Some(ping) = &broadcast.last_ping {
            if ping.outpoint != broadcast.outpoint {
                return Err(ProtocolError::PingMismatch {
                    broadcast: broadcast.outpoint,
                    ping: ping.outpoint,
                });
            }
            ping.verify(&broadcast.node_pubkey)
                .map_err(ProtocolError::InvalidPingSignature)?;
        }

        let mut guard = self.registry.lock();
        let state = &mut *guard;
        let outcome = match state.entries.entry(broadcast.outpoint) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.collateral_pubkey != broadcast.collateral_pubkey {
                    return Err(ProtocolError::CollateralKeyMismatch(broadcast.outpoint));
                }
                if broadcast.sig_time <= entry.sig_time {
                    ProcessOutcome::Stale
                } else {
                    entry.apply_broadcast(broadcast);
                    entry.check(now, self.registry.chain(), profile);
                    ProcessOutcome::Updated
                }
            }
            Entry::Vacant(vacant) => {
                self.check_collateral(broadcast)?;
                let mut entry = ServiceNodeEntry::from_broadcast(broadcast);
                entry.check(now, self.registry.chain(), profile);
                vacant.insert(entry);
                ProcessOutcome::Added
            }
        };
        state
            .seen_broadcasts
            .put(broadcast.hash(), broadcast.clone());
        if let Some(ping) = &broadcast.last_ping {
            state.seen_pings.put(ping.hash(), ping.clone());
        }
        drop(guard);

        if outcome == ProcessOutcome::Added {
            info!(
                role = %profile.role,
                outpoint = %broadcast.outpoint,
                addr = %broadcast.addr,
                "Accepted new service node"
            );
        }
        Ok(outcome)
    }

    fn check_collateral(&self, broadcast: &ServiceNodeBroadcast) -> ProtocolResult<()> {
        let profile = self.registry.profile();
        let utxo = self
            .registry
            .chain()
            .output(&broadcast.outpoint)
            .ok_or(ProtocolError::CollateralNotFound(broadcast.outpoint))?;
        if utxo.value != profile.collateral {
            return Err(ProtocolError::CollateralValue {
                outpoint: broadcast.outpoint,
                expected: profile.collateral,
                actual: utxo.value,
            });
        }
        if utxo.confirmations < profile.min_confirmations {
            return Err(ProtocolError::CollateralTooNew {
                outpoint: broadcast.outpoint,
                confirmations: utxo.confirmations,
                required: profile.min_confirmations,
            });
        }
        Ok(())
    }

    pub fn process_ping(&self, ping: &ServiceNodePing) -> ProtocolResult<ProcessOutcome> {
        let hash = ping.hash();
        if self.registry.has_seen_ping(&hash) {
            debug!(outpoint = %ping.outpoint, "Ignoring known ping {}", hash);
            return Ok(ProcessOutcome::Duplicate);
        }

        let outcome = self.validate_and_apply_ping(ping);
        match &outcome {
            Ok(outcome) if outcome.is_relayed() => {
                self.transport
                    .relay(&ServiceNodeMessage::Ping(self.registry.role(), ping.clone()));
            }
            Ok(_) => {}
            Err(e) => debug!(
                role = %self.registry.role(),
                outpoint = %ping.outpoint,
                "Rejected ping: {}",
                e
            ),
        }
        outcome
    }

    fn validate_and_apply_ping(&self, ping: &ServiceNodePing) -> ProtocolResult<ProcessOutcome> {
        let profile = self.registry.profile();
        let now = self.registry.now();

        if ping.sig_time > now + MAX_FUTURE_DRIFT_SECONDS {
            return Err(ProtocolError::FromFuture {
                sig_time: ping.sig_time,
                now,
            });
        }
        if ping.sig_time <= now - MAX_PING_AGE_SECONDS {
            return Err(ProtocolError::TooOld {
                sig_time: ping.sig_time,
                now,
            });
        }

        let mut guard = self.registry.lock();
        let state = &mut *guard;
        let entry = state
            .entries
            .get(&ping.outpoint)
            .ok_or(ProtocolError::UnknownServiceNode(ping.outpoint))?;
        if entry.protocol_version < profile.min_protocol_version {
            return Err(ProtocolError::ObsoleteProtocol {
                version: entry.protocol_version,
                minimum: profile.min_protocol_version,
            });
        }
        let flood_window = profile
            .ping_interval_secs
            .saturating_sub(PING_FLOOD_SLACK_SECONDS);
        if entry.is_pinged_within(flood_window, ping.sig_time) {
            return Err(ProtocolError::PingTooEarly(ping.outpoint));
        }
        ping.verify(&entry.node_pubkey)
            .map_err(ProtocolError::InvalidPingSignature)?;

        state.record_ping(&ping.outpoint, ping);
        if let Some(entry) = state.entries.get_mut(&ping.outpoint) {
            if entry.state == ServiceNodeState::Expired {
                entry.check(now, self.registry.chain(), profile);
            }
        }
        Ok(ProcessOutcome::Updated)
    }
}
