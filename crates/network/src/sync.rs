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

//! Progress of the local node's synchronisation.

/// Reports whether the chain and the service-node roster are caught up.
///
/// `process` is called once per scheduler tick and may advance internal
/// state; the predicates are cheap and side-effect free.
pub trait SyncOracle: Send + Sync {
    fn process(&self);

    fn is_blockchain_synced(&self) -> bool;

    fn is_roster_synced(&self) -> bool;

    fn is_synced(&self) -> bool {
        self.is_blockchain_synced() && self.is_roster_synced()
    }
}
