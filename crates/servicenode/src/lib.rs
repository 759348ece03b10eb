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

//! Crown service nodes.
//!
//! Masternodes and systemnodes share one liveness machinery, parameterised
//! by a [`RoleProfile`](crown_config::RoleProfile):
//!
//! * [`ServiceNodeRegistry`] holds the roster of announced nodes and the
//!   dedup caches of seen broadcasts and pings.
//! * [`ServiceNodeProtocol`] validates inbound broadcasts and pings, applies
//!   them to the registry and relays what it accepted.
//! * [`ActiveServiceNode`] runs the local node: capability checks,
//!   registration and the periodic ping.
//! * [`SyncScheduler`] ticks once per second and drives all of the above.

pub mod active;
pub mod entry;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod scheduler;
pub mod sync;

pub use active::{ActiveContext, ActiveServiceNode, ActiveSettings, ActiveStatus};
pub use entry::{ServiceNodeEntry, ServiceNodeState};
pub use error::{ProtocolError, RegistryError, Result, ServiceNodeError, StartError};
pub use protocol::{ProcessOutcome, ProtocolResult, ServiceNodeProtocol, PING_FLOOD_SLACK_SECONDS};
pub use registry::{CheckReport, ServiceNodeRegistry};
pub use router::ServiceNodeRouter;
pub use scheduler::{Housekeeper, RoleDriver, SyncScheduler, TickReport};
pub use sync::{ScriptedSync, ServiceNodeSync, SyncStage, SyncTimings};
