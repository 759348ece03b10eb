// Copyright (C) 2014-2026 The Crown Developers.
//
// memory_wallet.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! In-memory wallet.
//!
//! Coins live behind a single mutex. Callers that need several coin
//! operations to be atomic take a [`CoinLock`], which holds the mutex until
//! it is dropped.

use crate::{CollateralOutput, Error, Result, Wallet};
use crown_core::{ChainView, OutPoint};
use crown_cryptography::KeyPair;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// An output owned by the wallet.
#[derive(Debug, Clone)]
pub struct WalletCoin {
    pub outpoint: OutPoint,
    pub value: u64,
    /// Used when the wallet is not attached to a chain view.
    pub confirmations: u32,
    pub trusted: bool,
    pub key: KeyPair,
}

#[derive(Debug, Default)]
struct WalletState {
    locked: bool,
    coins: Vec<WalletCoin>,
    reserved: HashSet<OutPoint>,
}

/// Exclusive access to the wallet's coin set.
pub struct CoinLock<'a> {
    state: MutexGuard<'a, WalletState>,
}

impl CoinLock<'_> {
    pub fn lock_output(&mut self, outpoint: &OutPoint) -> Result<()> {
        if !self.state.coins.iter().any(|c| c.outpoint == *outpoint) {
            return Err(Error::UnknownOutput(*outpoint));
        }
        if !self.state.reserved.insert(*outpoint) {
            return Err(Error::AlreadyLocked(*outpoint));
        }
        debug!("Locked wallet output {}", outpoint);
        Ok(())
    }

    pub fn unlock_output(&mut self, outpoint: &OutPoint) -> bool {
        self.state.reserved.remove(outpoint)
    }

    pub fn is_output_locked(&self, outpoint: &OutPoint) -> bool {
        self.state.reserved.contains(outpoint)
    }

    pub fn locked_outputs(&self) -> Vec<OutPoint> {
        let mut outputs: Vec<_> = self.state.reserved.iter().copied().collect();
        outputs.sort();
        outputs
    }
}

/// Wallet keeping its coins and keys in memory.
pub struct MemoryWallet {
    state: Mutex<WalletState>,
    chain: Option<Arc<dyn ChainView>>,
}

impl Default for MemoryWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWallet {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WalletState::default()),
            chain: None,
        }
    }

    /// Reads confirmations and spentness from `chain` instead of the
    /// per-coin values.
    pub fn with_chain(chain: Arc<dyn ChainView>) -> Self {
        Self {
            state: Mutex::new(WalletState::default()),
            chain: Some(chain),
        }
    }

    pub fn add_coin(&self, coin: WalletCoin) -> Result<()> {
        let mut state = self.state.lock();
        if state.coins.iter().any(|c| c.outpoint == coin.outpoint) {
            return Err(Error::DuplicateOutput(coin.outpoint));
        }
        state.coins.push(coin);
        Ok(())
    }

    pub fn set_locked(&self, locked: bool) {
        self.state.lock().locked = locked;
    }

    pub fn set_confirmations(&self, outpoint: &OutPoint, confirmations: u32) -> Result<()> {
        let mut state = self.state.lock();
        let coin = state
            .coins
            .iter_mut()
            .find(|c| c.outpoint == *outpoint)
            .ok_or(Error::UnknownOutput(*outpoint))?;
        coin.confirmations = confirmations;
        Ok(())
    }

    /// Takes the coin mutex until the returned guard is dropped.
    pub fn coin_lock(&self) -> CoinLock<'_> {
        CoinLock {
            state: self.state.lock(),
        }
    }

    /// Every unreserved, unspent output worth exactly `value`, in
    /// insertion order.
    pub fn collateral_candidates(&self, value: u64) -> Vec<OutPoint> {
        let state = self.state.lock();
        state
            .coins
            .iter()
            .filter(|c| c.value == value)
            .filter(|c| !state.reserved.contains(&c.outpoint))
            .filter(|c| self.is_unspent(&c.outpoint))
            .map(|c| c.outpoint)
            .collect()
    }

    fn is_unspent(&self, outpoint: &OutPoint) -> bool {
        match &self.chain {
            Some(chain) => chain.output(outpoint).is_some(),
            None => true,
        }
    }
}

impl Wallet for MemoryWallet {
    fn is_locked(&self) -> bool {
        self.state.lock().locked
    }

    fn trusted_balance(&self) -> u64 {
        let state = self.state.lock();
        state
            .coins
            .iter()
            .filter(|c| c.trusted && self.is_unspent(&c.outpoint))
            .map(|c| c.value)
            .sum()
    }

    fn select_and_lock_collateral(
        &self,
        required_value: u64,
        previous: Option<&OutPoint>,
    ) -> Option<CollateralOutput> {
        let mut state = self.state.lock();
        let usable = |c: &WalletCoin| c.value == required_value && self.is_unspent(&c.outpoint);
        let selected = previous
            .and_then(|p| state.coins.iter().find(|c| c.outpoint == *p && usable(*c)))
            .or_else(|| {
                state
                    .coins
                    .iter()
                    .find(|c| !state.reserved.contains(&c.outpoint) && usable(*c))
            })
            .map(|c| CollateralOutput {
                outpoint: c.outpoint,
                value: c.value,
                key: c.key.clone(),
            })?;

        if state.reserved.insert(selected.outpoint) {
            debug!("Locked wallet output {}", selected.outpoint);
        }
        Some(selected)
    }

    fn unlock_output(&self, outpoint: &OutPoint) -> bool {
        self.coin_lock().unlock_output(outpoint)
    }

    fn confirmations(&self, outpoint: &OutPoint) -> u32 {
        if let Some(chain) = &self.chain {
            return chain.output(outpoint).map_or(0, |utxo| utxo.confirmations);
        }
        self.state
            .lock()
            .coins
            .iter()
            .find(|c| c.outpoint == *outpoint)
            .map_or(0, |c| c.confirmations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crown_core::{MemoryChain, UInt256};

    fn outpoint(n: u8) -> OutPoint {
        OutPoint::new(UInt256::from_bytes([n; 32]), 0)
    }

    fn coin(n: u8, value: u64) -> WalletCoin {
        WalletCoin {
            outpoint: outpoint(n),
            value,
            confirmations: 20,
            trusted: true,
            key: KeyPair::generate(),
        }
    }

    #[test]
    fn test_select_skips_reserved_and_wrong_values() {
        let wallet = MemoryWallet::new();
        wallet.add_coin(coin(1, 499)).unwrap();
        wallet.add_coin(coin(2, 500)).unwrap();
        wallet.add_coin(coin(3, 500)).unwrap();

        assert_eq!(wallet.collateral_candidates(500), vec![outpoint(2), outpoint(3)]);
        wallet.coin_lock().lock_output(&outpoint(2)).unwrap();

        let selected = wallet.select_and_lock_collateral(500, None).unwrap();
        assert_eq!(selected.outpoint, outpoint(3));
        assert_eq!(selected.value, 500);
        assert!(wallet.collateral_candidates(500).is_empty());
    }

    #[test]
    fn test_lock_unknown_output() {
        let wallet = MemoryWallet::new();
        assert_eq!(
            wallet.coin_lock().lock_output(&outpoint(9)),
            Err(Error::UnknownOutput(outpoint(9)))
        );
    }

    #[test]
    fn test_second_reservation_is_an_error() {
        let wallet = MemoryWallet::new();
        wallet.add_coin(coin(1, 500)).unwrap();
        let mut guard = wallet.coin_lock();
        guard.lock_output(&outpoint(1)).unwrap();
        assert_eq!(
            guard.lock_output(&outpoint(1)),
            Err(Error::AlreadyLocked(outpoint(1)))
        );
    }

    #[test]
    fn test_concurrent_selectors_never_share_an_output() {
        let wallet = Arc::new(MemoryWallet::new());
        for n in 1..=4 {
            wallet.add_coin(coin(n, 500)).unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let wallet = wallet.clone();
                std::thread::spawn(move || {
                    wallet
                        .select_and_lock_collateral(500, None)
                        .map(|c| c.outpoint)
                })
            })
            .collect();
        let mut won: Vec<_> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        won.sort();

        assert_eq!(won, (1..=4).map(outpoint).collect::<Vec<_>>());
    }

    #[test]
    fn test_previous_reservation_is_handed_back() {
        let chain = Arc::new(MemoryChain::new(50));
        chain.add_output(outpoint(1), 500, 20);
        let wallet = MemoryWallet::with_chain(chain.clone());
        wallet.add_coin(coin(1, 500)).unwrap();

        let first = wallet.select_and_lock_collateral(500, None).unwrap();
        assert!(wallet.select_and_lock_collateral(500, None).is_none());
        let again = wallet
            .select_and_lock_collateral(500, Some(&first.outpoint))
            .unwrap();
        assert_eq!(again.outpoint, first.outpoint);
        assert!(wallet.coin_lock().is_output_locked(&first.outpoint));

        // Not once it has been spent.
        chain.spend(&outpoint(1));
        assert!(wallet
            .select_and_lock_collateral(500, Some(&first.outpoint))
            .is_none());
    }

    #[test]
    fn test_coin_lock_scope() {
        let wallet = MemoryWallet::new();
        wallet.add_coin(coin(1, 500)).unwrap();
        {
            let mut guard = wallet.coin_lock();
            guard.lock_output(&outpoint(1)).unwrap();
            assert!(guard.is_output_locked(&outpoint(1)));
            assert_eq!(guard.locked_outputs(), vec![outpoint(1)]);
        }
        // Guard dropped; the wallet is usable again.
        assert!(wallet.select_and_lock_collateral(500, None).is_none());
        assert!(wallet.unlock_output(&outpoint(1)));
        assert!(!wallet.unlock_output(&outpoint(1)));
        assert!(wallet.select_and_lock_collateral(500, None).is_some());
    }

    #[test]
    fn test_balance_counts_trusted_only() {
        let wallet = MemoryWallet::new();
        wallet.add_coin(coin(1, 300)).unwrap();
        let mut untrusted = coin(2, 700);
        untrusted.trusted = false;
        wallet.add_coin(untrusted).unwrap();
        assert_eq!(wallet.trusted_balance(), 300);
        assert_eq!(
            wallet.add_coin(coin(1, 1)).unwrap_err(),
            Error::DuplicateOutput(outpoint(1))
        );
    }

    #[test]
    fn test_chain_backed_confirmations() {
        let chain = Arc::new(MemoryChain::new(50));
        chain.add_output(outpoint(1), 500, 3);
        let wallet = MemoryWallet::with_chain(chain.clone());
        wallet.add_coin(coin(1, 500)).unwrap();

        assert_eq!(wallet.confirmations(&outpoint(1)), 3);
        chain.set_height(62);
        assert_eq!(wallet.confirmations(&outpoint(1)), 15);

        chain.spend(&outpoint(1));
        assert_eq!(wallet.confirmations(&outpoint(1)), 0);
        assert!(wallet.select_and_lock_collateral(500, None).is_none());
        assert_eq!(wallet.trusted_balance(), 0);
    }
}
