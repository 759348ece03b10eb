// Copyright (C) 2014-2026 The Crown Developers.
//
// registry.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Service-node roster with replay caches.
//!
//! Entries and both seen caches sit behind a single mutex so that a ping
//! update, its seen-cache insert and the patch of the cached broadcast are
//! one atomic step. No method holds the lock across an await point.

use crate::entry::{ServiceNodeEntry, ServiceNodeState};
use crate::error::RegistryError;
use crown_config::{Role, RoleProfile};
use crown_core::{ChainView, Clock, OutPoint, UInt256};
use crown_cryptography::PublicKey;
use crown_network::{ServiceNodeBroadcast, ServiceNodePing};
use lru::LruCache;
use parking_lot::{Mutex, MutexGuard};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) struct RegistryState {
    pub(crate) entries: HashMap<OutPoint, ServiceNodeEntry>,
    pub(crate) seen_broadcasts: LruCache<UInt256, ServiceNodeBroadcast>,
    pub(crate) seen_pings: LruCache<UInt256, ServiceNodePing>,
}

impl RegistryState {
    /// Points the cached copy of `entry`'s broadcast at `ping`.
    fn patch_seen_broadcast(&mut self, entry: &ServiceNodeEntry, ping: &ServiceNodePing) {
        if let Some(cached) = self.seen_broadcasts.get_mut(&entry.broadcast_hash()) {
            cached.last_ping = Some(ping.clone());
        }
    }

    pub(crate) fn record_ping(&mut self, outpoint: &OutPoint, ping: &ServiceNodePing) {
        self.seen_pings.put(ping.hash(), ping.clone());
        if let Some(entry) = self.entries.get_mut(outpoint) {
            entry.apply_ping(ping);
            let entry = entry.clone();
            self.patch_seen_broadcast(&entry, ping);
        }
    }
}

/// Outcome of one [`ServiceNodeRegistry::check_and_remove`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub enabled: usize,
    pub expired: usize,
    pub removed: Vec<OutPoint>,
    pub pruned_broadcasts: usize,
    pub pruned_pings: usize,
}

pub struct ServiceNodeRegistry {
    profile: RoleProfile,
    chain: Arc<dyn ChainView>,
    clock: Arc<dyn Clock>,
    state: Mutex<RegistryState>,
}

impl ServiceNodeRegistry {
    pub fn new(
        profile: RoleProfile,
        chain: Arc<dyn ChainView>,
        clock: Arc<dyn Clock>,
        seen_capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(seen_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            profile,
            chain,
            clock,
            state: Mutex::new(RegistryState {
                entries: HashMap::new(),
                seen_broadcasts: LruCache::new(capacity),
                seen_pings: LruCache::new(capacity),
            }),
        }
    }

    pub fn profile(&self) -> &RoleProfile {
        &self.profile
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub(crate) fn chain(&self) -> &dyn ChainView {
        self.chain.as_ref()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, outpoint: &OutPoint) -> Option<ServiceNodeEntry> {
        self.state.lock().entries.get(outpoint).cloned()
    }

    pub fn find_by_pubkey(&self, node_pubkey: &PublicKey) -> Option<ServiceNodeEntry> {
        self.state
            .lock()
            .entries
            .values()
            .find(|entry| entry.node_pubkey == *node_pubkey)
            .cloned()
    }

    /// Re-evaluates one entry and returns its state.
    pub fn check_entry(&self, outpoint: &OutPoint) -> Option<ServiceNodeState> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let entry = state.entries.get_mut(outpoint)?;
        entry.check(now, self.chain.as_ref(), &self.profile);
        Some(entry.state)
    }

    /// Snapshot of all entries, ordered by collateral.
    pub fn entries(&self) -> Vec<ServiceNodeEntry> {
        let mut entries: Vec<_> = self.state.lock().entries.values().cloned().collect();
        entries.sort_by(|a, b| a.outpoint.cmp(&b.outpoint));
        entries
    }

    /// Endpoints of enabled entries.
    pub fn endpoints(&self) -> Vec<SocketAddr> {
        let mut endpoints: Vec<_> = self
            .state
            .lock()
            .entries
            .values()
            .filter(|entry| entry.is_enabled())
            .map(|entry| entry.addr)
            .collect();
        endpoints.sort();
        endpoints.dedup();
        endpoints
    }

    pub fn has_seen_broadcast(&self, hash: &UInt256) -> bool {
        self.state.lock().seen_broadcasts.contains(hash)
    }

    pub fn has_seen_ping(&self, hash: &UInt256) -> bool {
        self.state.lock().seen_pings.contains(hash)
    }

    pub fn seen_broadcast(&self, hash: &UInt256) -> Option<ServiceNodeBroadcast> {
        self.state.lock().seen_broadcasts.peek(hash).cloned()
    }

    pub fn seen_counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.seen_broadcasts.len(), state.seen_pings.len())
    }

    /// Records a locally created broadcast as seen and inserts or updates
    /// the entry it announces.
    pub fn update_from_broadcast(&self, broadcast: &ServiceNodeBroadcast) {
        let mut state = self.state.lock();
        state
            .seen_broadcasts
            .put(broadcast.hash(), broadcast.clone());
        if let Some(ping) = &broadcast.last_ping {
            state.seen_pings.put(ping.hash(), ping.clone());
        }
        match state.entries.entry(broadcast.outpoint) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.apply_broadcast(broadcast);
                entry.state = ServiceNodeState::Enabled;
                debug!(role = %self.profile.role, outpoint = %broadcast.outpoint, "Updated service node");
            }
            Entry::Vacant(vacant) => {
                vacant.insert(ServiceNodeEntry::from_broadcast(broadcast));
                info!(
                    role = %self.profile.role,
                    outpoint = %broadcast.outpoint,
                    addr = %broadcast.addr,
                    "Added service node"
                );
            }
        }
    }

    /// Stores our own freshly signed ping. Fails if the entry is gone or
    /// was pinged within the role's ping interval.
    pub fn record_local_ping(&self, ping: &ServiceNodePing) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        let entry = state
            .entries
            .get(&ping.outpoint)
            .ok_or(RegistryError::NotRegistered(ping.outpoint))?;
        if entry.is_pinged_within(self.profile.ping_interval_secs, ping.sig_time) {
            return Err(RegistryError::PingedTooRecently(ping.outpoint));
        }
        state.record_ping(&ping.outpoint, ping);
        Ok(())
    }

    /// Recomputes every entry's liveness, drops spent and removed entries
    /// and prunes the seen caches.
    pub fn check_and_remove(&self) -> CheckReport {
        let now = self.clock.now();
        let mut report = CheckReport::default();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        for entry in state.entries.values_mut() {
            entry.check(now, self.chain.as_ref(), &self.profile);
            match entry.state {
                ServiceNodeState::Enabled => report.enabled += 1,
                ServiceNodeState::Expired => report.expired += 1,
                ServiceNodeState::Removed | ServiceNodeState::VinSpent => {
                    report.removed.push(entry.outpoint)
                }
            }
        }
        report.removed.sort();
        for outpoint in &report.removed {
            if let Some(entry) = state.entries.remove(outpoint) {
                info!(
                    role = %self.profile.role,
                    outpoint = %outpoint,
                    state = %entry.state,
                    "Removing service node"
                );
            }
        }

        let stale_broadcasts: Vec<UInt256> = state
            .seen_broadcasts
            .iter()
            .filter(|(_, b)| !state.entries.contains_key(&b.outpoint))
            .map(|(hash, _)| *hash)
            .collect();
        for hash in &stale_broadcasts {
            state.seen_broadcasts.pop(hash);
        }
        report.pruned_broadcasts = stale_broadcasts.len();

        let removal = self.profile.removal_secs;
        let stale_pings: Vec<UInt256> = state
            .seen_pings
            .iter()
            .filter(|(_, p)| {
                !state.entries.contains_key(&p.outpoint) || now.abs_diff(p.sig_time) >= removal
            })
            .map(|(hash, _)| *hash)
            .collect();
        for hash in &stale_pings {
            state.seen_pings.pop(hash);
        }
        report.pruned_pings = stale_pings.len();

        debug!(
            role = %self.profile.role,
            enabled = report.enabled,
            expired = report.expired,
            removed = report.removed.len(),
            "Checked service node list"
        );
        report
    }
}
