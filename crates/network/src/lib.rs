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

//! Crown service-node networking.
//!
//! Message types for the broadcast/ping protocol together with their wire
//! codec, the [`Transport`] the service-node layer relays through, and the
//! [`SyncOracle`] interface reporting local sync progress.

pub mod error;
pub mod messages;
pub mod sync;
pub mod transport;

pub use error::{NetworkError, NetworkResult};
pub use messages::{
    MessageCommand, MessageHeader, ServiceNodeBroadcast, ServiceNodeMessage, ServiceNodePing,
};
pub use sync::SyncOracle;
pub use transport::{accept_messages, read_message, RecordingTransport, TcpTransport, Transport};
