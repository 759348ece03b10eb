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

//! # Crown Core
//!
//! Fundamental types shared by the service-node crates:
//!
//! - **Hashes**: [`UInt256`] (transaction ids, message hashes) and
//!   [`UInt160`] (key ids)
//! - **Collateral**: [`OutPoint`] references into the UTXO set
//! - **Time**: the [`Clock`] abstraction, so timing windows can be driven
//!   deterministically in tests
//! - **Chain view**: the narrow [`ChainView`] interface onto the external
//!   consensus engine
//! - **Shutdown**: the process-wide [`ShutdownSignal`]

#![warn(rustdoc::missing_crate_level_docs)]

/// Read-only view of the external chain state
pub mod chain;
/// Wall-clock abstraction
pub mod clock;
/// Core error types
pub mod error;
/// Collateral output references
pub mod outpoint;
/// Process-wide shutdown flag
pub mod shutdown;
/// 160-bit hash
pub mod uint160;
/// 256-bit hash
pub mod uint256;

pub use chain::{ChainView, MemoryChain, UtxoEntry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use outpoint::OutPoint;
pub use shutdown::ShutdownSignal;
pub use uint160::UInt160;
pub use uint256::UInt256;
