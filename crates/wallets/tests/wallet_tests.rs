// Copyright (C) 2014-2026 The Crown Developers.
//
// wallet_tests.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Wallet behaviour as seen through the `Wallet` trait object the
//! controller holds.

use crown_config::{NetworkType, COIN};
use crown_core::{OutPoint, UInt256};
use crown_cryptography::KeyPair;
use crown_wallets::*;
use std::sync::Arc;

fn funded_wallet(key: &KeyPair) -> Arc<MemoryWallet> {
    let wallet = Arc::new(MemoryWallet::new());
    wallet
        .add_coin(WalletCoin {
            outpoint: OutPoint::new(UInt256::from_bytes([7u8; 32]), 1),
            value: 500 * COIN,
            confirmations: 16,
            trusted: true,
            key: key.clone(),
        })
        .unwrap();
    wallet
}

#[test]
fn test_collateral_carries_controlling_key() {
    let key = KeyPair::from_wif(
        "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn",
        NetworkType::MainNet,
    )
    .unwrap();
    let wallet: Arc<dyn Wallet> = funded_wallet(&key);

    assert!(wallet.select_and_lock_collateral(10_000 * COIN, None).is_none());
    let collateral = wallet.select_and_lock_collateral(500 * COIN, None).unwrap();
    assert_eq!(collateral.public_key(), key.public_key());
    assert_eq!(wallet.confirmations(&collateral.outpoint), 16);
}

#[test]
fn test_locked_collateral_is_not_reselected() {
    let wallet: Arc<dyn Wallet> = funded_wallet(&KeyPair::generate());
    let first = wallet.select_and_lock_collateral(500 * COIN, None).unwrap();
    assert!(wallet.select_and_lock_collateral(500 * COIN, None).is_none());
    // Reserved coins still count towards the balance.
    assert_eq!(wallet.trusted_balance(), 500 * COIN);

    // Released coins can be selected again.
    assert!(wallet.unlock_output(&first.outpoint));
    let second = wallet.select_and_lock_collateral(500 * COIN, None).unwrap();
    assert_eq!(second.outpoint, first.outpoint);
}

#[test]
fn test_wallet_lock_flag() {
    let wallet = funded_wallet(&KeyPair::generate());
    assert!(!wallet.is_locked());
    wallet.set_locked(true);
    assert!(wallet.is_locked());
}

#[test]
fn test_errors_display() {
    let outpoint = OutPoint::new(UInt256::zero(), 3);
    assert_eq!(
        Error::UnknownOutput(outpoint).to_string(),
        format!("Output not found in wallet: {}", outpoint)
    );
    assert_eq!(Error::WalletLocked.to_string(), "Wallet is locked");
}
