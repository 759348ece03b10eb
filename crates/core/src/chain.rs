// Copyright (C) 2014-2026 The Crown Developers.
//
// chain.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Read-only view onto the external chain state.
//!
//! Block validation and UTXO bookkeeping belong to the consensus engine.
//! The service-node layer only needs to know whether the chain is still
//! catching up and whether a collateral output still exists.

use crate::OutPoint;
use parking_lot::RwLock;
use std::collections::HashMap;

/// An unspent output as seen by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtxoEntry {
    pub value: u64,
    pub confirmations: u32,
}

pub trait ChainView: Send + Sync {
    /// Reindexing or importing blocks from disk.
    fn is_importing(&self) -> bool;

    /// Still downloading the initial chain from peers.
    fn is_initial_block_download(&self) -> bool;

    /// Looks up an unspent output; `None` once it is spent or unknown.
    fn output(&self, outpoint: &OutPoint) -> Option<UtxoEntry>;
}

#[derive(Debug, Default)]
struct MemoryChainState {
    height: u32,
    importing: bool,
    initial_download: bool,
    /// outpoint -> (value, height the output was mined at)
    outputs: HashMap<OutPoint, (u64, u32)>,
}

/// In-memory chain view for regtest nodes and tests.
#[derive(Debug, Default)]
pub struct MemoryChain {
    state: RwLock<MemoryChainState>,
}

impl MemoryChain {
    pub fn new(height: u32) -> Self {
        Self {
            state: RwLock::new(MemoryChainState {
                height,
                ..Default::default()
            }),
        }
    }

    pub fn height(&self) -> u32 {
        self.state.read().height
    }

    pub fn set_height(&self, height: u32) {
        self.state.write().height = height;
    }

    pub fn set_importing(&self, importing: bool) {
        self.state.write().importing = importing;
    }

    pub fn set_initial_download(&self, initial_download: bool) {
        self.state.write().initial_download = initial_download;
    }

    /// Adds an output with the given number of confirmations at the
    /// current height.
    pub fn add_output(&self, outpoint: OutPoint, value: u64, confirmations: u32) {
        let mut state = self.state.write();
        let mined_at = (state.height + 1).saturating_sub(confirmations);
        state.outputs.insert(outpoint, (value, mined_at));
    }

    pub fn spend(&self, outpoint: &OutPoint) -> bool {
        self.state.write().outputs.remove(outpoint).is_some()
    }
}

impl ChainView for MemoryChain {
    fn is_importing(&self) -> bool {
        self.state.read().importing
    }

    fn is_initial_block_download(&self) -> bool {
        self.state.read().initial_download
    }

    fn output(&self, outpoint: &OutPoint) -> Option<UtxoEntry> {
        let state = self.state.read();
        state.outputs.get(outpoint).map(|(value, mined_at)| UtxoEntry {
            value: *value,
            confirmations: (state.height + 1).saturating_sub(*mined_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UInt256;

    #[test]
    fn test_confirmations_follow_height() {
        let chain = MemoryChain::new(100);
        let outpoint = OutPoint::new(UInt256::from_bytes([1u8; 32]), 0);
        chain.add_output(outpoint, 500, 10);
        assert_eq!(chain.output(&outpoint).unwrap().confirmations, 10);

        chain.set_height(105);
        assert_eq!(
            chain.output(&outpoint),
            Some(UtxoEntry {
                value: 500,
                confirmations: 15
            })
        );

        assert!(chain.spend(&outpoint));
        assert!(chain.output(&outpoint).is_none());
    }

    #[test]
    fn test_flags() {
        let chain = MemoryChain::default();
        assert!(!chain.is_importing());
        chain.set_importing(true);
        chain.set_initial_download(true);
        assert!(chain.is_importing());
        assert!(chain.is_initial_block_download());
    }
}
