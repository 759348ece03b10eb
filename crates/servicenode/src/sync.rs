// Copyright (C) 2014-2026 The Crown Developers.
//
// sync.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Roster sync state machine.
//!
//! A node must not try to start its own service node before it has both a
//! settled chain and a reasonably complete roster. [`ServiceNodeSync`]
//! tracks that per role and is advanced by the scheduler once per tick.

use crown_core::{ChainView, Clock};
use crown_network::SyncOracle;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Seconds the chain has to stay out of initial download before the
/// blockchain stage completes.
pub const BLOCKCHAIN_SETTLE_SECONDS: i64 = 5;

/// Seconds without roster traffic after which the list stage completes.
pub const LIST_QUIET_SECONDS: i64 = 30;

/// Sync stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyncStage {
    /// Not started
    Initial,
    /// Waiting for the chain to settle
    Blockchain,
    /// Collecting roster announcements
    List,
    /// Fully synced
    Finished,
}

#[derive(Debug, Clone, Copy)]
pub struct SyncTimings {
    pub settle_secs: i64,
    pub quiet_secs: i64,
}

impl Default for SyncTimings {
    fn default() -> Self {
        Self {
            settle_secs: BLOCKCHAIN_SETTLE_SECONDS,
            quiet_secs: LIST_QUIET_SECONDS,
        }
    }
}

#[derive(Debug)]
struct SyncProgress {
    stage: SyncStage,
    settled_since: Option<i64>,
    last_activity: i64,
}

pub struct ServiceNodeSync {
    label: &'static str,
    chain: Arc<dyn ChainView>,
    clock: Arc<dyn Clock>,
    timings: SyncTimings,
    progress: Mutex<SyncProgress>,
}

impl ServiceNodeSync {
    pub fn new(
        label: &'static str,
        chain: Arc<dyn ChainView>,
        clock: Arc<dyn Clock>,
        timings: SyncTimings,
    ) -> Self {
        Self {
            label,
            chain,
            clock,
            timings,
            progress: Mutex::new(SyncProgress {
                stage: SyncStage::Initial,
                settled_since: None,
                last_activity: 0,
            }),
        }
    }

    pub fn stage(&self) -> SyncStage {
        self.progress.lock().stage
    }

    /// Roster traffic arrived; pushes the end of the list stage out.
    pub fn record_activity(&self) {
        let mut progress = self.progress.lock();
        if progress.stage == SyncStage::List {
            progress.last_activity = self.clock.now();
        }
    }

    /// Starts over from the blockchain stage.
    pub fn reset(&self) {
        let mut progress = self.progress.lock();
        progress.stage = SyncStage::Initial;
        progress.settled_since = None;
        info!(sync = self.label, "Sync reset");
    }

    fn chain_busy(&self) -> bool {
        self.chain.is_importing() || self.chain.is_initial_block_download()
    }
}

impl SyncOracle for ServiceNodeSync {
    fn process(&self) {
        let now = self.clock.now();
        let busy = self.chain_busy();
        let mut progress = self.progress.lock();

        match progress.stage {
            SyncStage::Initial => {
                progress.stage = SyncStage::Blockchain;
                progress.settled_since = None;
                debug!(sync = self.label, "Waiting for the chain to settle");
            }
            SyncStage::Blockchain => {
                if busy {
                    progress.settled_since = None;
                    return;
                }
                let since = *progress.settled_since.get_or_insert(now);
                if now - since >= self.timings.settle_secs {
                    progress.stage = SyncStage::List;
                    progress.last_activity = now;
                    info!(sync = self.label, "Blockchain synced, syncing list");
                }
            }
            SyncStage::List => {
                if busy {
                    progress.stage = SyncStage::Blockchain;
                    progress.settled_since = None;
                    return;
                }
                if now - progress.last_activity >= self.timings.quiet_secs {
                    progress.stage = SyncStage::Finished;
                    info!(sync = self.label, "Sync finished");
                }
            }
            SyncStage::Finished => {
                if busy {
                    progress.stage = SyncStage::Blockchain;
                    progress.settled_since = None;
                    info!(sync = self.label, "Chain fell behind, resyncing");
                }
            }
        }
    }

    fn is_blockchain_synced(&self) -> bool {
        self.stage() >= SyncStage::List
    }

    fn is_roster_synced(&self) -> bool {
        self.stage() == SyncStage::Finished
    }
}

/// Sync oracle whose answers are set by hand.
#[derive(Debug, Default)]
pub struct ScriptedSync {
    blockchain: AtomicBool,
    roster: AtomicBool,
    processed: AtomicUsize,
}

impl ScriptedSync {
    pub fn synced() -> Self {
        let sync = Self::default();
        sync.set(true, true);
        sync
    }

    pub fn set(&self, blockchain: bool, roster: bool) {
        self.blockchain.store(blockchain, Ordering::SeqCst);
        self.roster.store(roster, Ordering::SeqCst);
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }
}

impl SyncOracle for ScriptedSync {
    fn process(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    fn is_blockchain_synced(&self) -> bool {
        self.blockchain.load(Ordering::SeqCst)
    }

    fn is_roster_synced(&self) -> bool {
        self.roster.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crown_core::{ManualClock, MemoryChain};

    fn fixture() -> (Arc<MemoryChain>, Arc<ManualClock>, ServiceNodeSync) {
        let chain = Arc::new(MemoryChain::new(100));
        let clock = Arc::new(ManualClock::new(1_000));
        let sync = ServiceNodeSync::new(
            "systemnode",
            chain.clone(),
            clock.clone(),
            SyncTimings::default(),
        );
        (chain, clock, sync)
    }

    #[test]
    fn test_stages_advance_with_time() {
        let (_chain, clock, sync) = fixture();
        sync.process();
        assert_eq!(sync.stage(), SyncStage::Blockchain);

        sync.process();
        clock.advance(BLOCKCHAIN_SETTLE_SECONDS);
        sync.process();
        assert!(sync.is_blockchain_synced());
        assert!(!sync.is_roster_synced());

        clock.advance(LIST_QUIET_SECONDS);
        sync.process();
        assert!(sync.is_synced());
    }

    #[test]
    fn test_activity_extends_list_stage() {
        let (_chain, clock, sync) = fixture();
        sync.process();
        sync.process();
        clock.advance(BLOCKCHAIN_SETTLE_SECONDS);
        sync.process();
        assert_eq!(sync.stage(), SyncStage::List);

        clock.advance(LIST_QUIET_SECONDS - 1);
        sync.record_activity();
        clock.advance(2);
        sync.process();
        assert_eq!(sync.stage(), SyncStage::List);
    }

    #[test]
    fn test_initial_download_holds_blockchain_stage() {
        let (chain, clock, sync) = fixture();
        chain.set_initial_download(true);
        for _ in 0..10 {
            sync.process();
            clock.advance(10);
        }
        assert_eq!(sync.stage(), SyncStage::Blockchain);

        chain.set_initial_download(false);
        sync.process();
        clock.advance(BLOCKCHAIN_SETTLE_SECONDS);
        sync.process();
        assert_eq!(sync.stage(), SyncStage::List);
    }

    #[test]
    fn test_scripted_sync() {
        let sync = ScriptedSync::default();
        assert!(!sync.is_synced());
        sync.set(true, false);
        assert!(sync.is_blockchain_synced());
        assert!(!sync.is_synced());
        sync.process();
        assert_eq!(sync.processed(), 1);
    }
}
