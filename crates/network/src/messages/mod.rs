// Copyright (C) 2014-2026 The Crown Developers.
//
// mod.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Service-node network messages.
//!
//! Frames follow the usual layout: a 24-byte header (magic, zero-padded
//! command, payload length, checksum) followed by the payload encoded with
//! [`crown_io::Serializable`].

pub mod broadcast;
pub mod commands;
pub mod header;
pub mod message;
pub mod ping;

pub use broadcast::ServiceNodeBroadcast;
pub use commands::MessageCommand;
pub use header::{MessageHeader, HEADER_SIZE};
pub use message::ServiceNodeMessage;
pub use ping::ServiceNodePing;

/// Upper bound for a single service-node payload.
pub const MAX_MESSAGE_SIZE: usize = 0x0010_0000;
