// Copyright (C) 2014-2026 The Crown Developers.
//
// wallet.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! The wallet interface consumed by the active service-node controller.

use crown_core::OutPoint;
use crown_cryptography::{KeyPair, PrivateKey, PublicKey};

/// A spendable collateral output and the key that controls it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollateralOutput {
    pub outpoint: OutPoint,
    pub value: u64,
    pub key: KeyPair,
}

impl CollateralOutput {
    pub fn public_key(&self) -> &PublicKey {
        self.key.public_key()
    }

    pub fn private_key(&self) -> &PrivateKey {
        self.key.private_key()
    }
}

pub trait Wallet: Send + Sync {
    /// Locked wallets cannot produce collateral keys.
    fn is_locked(&self) -> bool;

    /// Sum of confirmed, trusted outputs in base units.
    fn trusted_balance(&self) -> u64;

    /// Picks an unspent output of exactly `required_value` and reserves it
    /// under a single wallet lock, so two callers never receive the same
    /// output. `previous` is an output the caller reserved earlier; it is
    /// handed back again while it is still unspent and worth
    /// `required_value`.
    fn select_and_lock_collateral(
        &self,
        required_value: u64,
        previous: Option<&OutPoint>,
    ) -> Option<CollateralOutput>;

    /// Releases a reservation. Returns false when `outpoint` was not
    /// reserved.
    fn unlock_output(&self, outpoint: &OutPoint) -> bool;

    /// Confirmation depth of `outpoint`; zero when unknown or unconfirmed.
    fn confirmations(&self, outpoint: &OutPoint) -> u32;
}
