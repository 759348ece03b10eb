// Copyright (C) 2014-2026 The Crown Developers.
//
// lib.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Crown Wallets Library
//!
//! The service-node controller needs very little from a wallet: whether it
//! is locked, its trusted balance, a spendable output of exactly the
//! collateral amount together with the key that controls it, reserved in
//! the same step so it is never spent or handed out twice. This crate defines
//! that narrow [`Wallet`] interface and an in-memory implementation.

pub mod memory_wallet;
pub mod wallet;

pub use memory_wallet::{CoinLock, MemoryWallet, WalletCoin};
pub use wallet::{CollateralOutput, Wallet};

use crown_core::OutPoint;
use thiserror::Error;

/// Result type for wallet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Alias used by crates that also carry their own `Error`.
pub type WalletError = Error;

/// Wallet-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Wallet is locked")]
    WalletLocked,

    #[error("Output not found in wallet: {0}")]
    UnknownOutput(OutPoint),

    #[error("Output already locked: {0}")]
    AlreadyLocked(OutPoint),

    #[error("Output already in wallet: {0}")]
    DuplicateOutput(OutPoint),

    #[error("Key error: {0}")]
    Key(#[from] crown_cryptography::Error),
}
