// Copyright (C) 2014-2026 The Crown Developers.
//
// message.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Service-node message envelope and framing.

use super::{
    broadcast::ServiceNodeBroadcast,
    commands::MessageCommand,
    header::{MessageHeader, HEADER_SIZE},
    ping::ServiceNodePing,
};
use crate::{NetworkError, NetworkResult as Result};
use crown_config::Role;
use crown_core::UInt256;
use crown_io::SerializableExt;

/// A service-node message for either role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceNodeMessage {
    Broadcast(Role, ServiceNodeBroadcast),
    Ping(Role, ServiceNodePing),
}

impl ServiceNodeMessage {
    pub fn role(&self) -> Role {
        match self {
            Self::Broadcast(role, _) | Self::Ping(role, _) => *role,
        }
    }

    pub fn command(&self) -> MessageCommand {
        match self {
            Self::Broadcast(Role::Masternode, _) => MessageCommand::MNB,
            Self::Ping(Role::Masternode, _) => MessageCommand::MNP,
            Self::Broadcast(Role::Systemnode, _) => MessageCommand::SNB,
            Self::Ping(Role::Systemnode, _) => MessageCommand::SNP,
        }
    }

    /// Dedup hash of the carried message.
    pub fn hash(&self) -> UInt256 {
        match self {
            Self::Broadcast(_, broadcast) => broadcast.hash(),
            Self::Ping(_, ping) => ping.hash(),
        }
    }

    pub fn payload(&self) -> Vec<u8> {
        match self {
            Self::Broadcast(_, broadcast) => broadcast.to_array(),
            Self::Ping(_, ping) => ping.to_array(),
        }
    }

    /// Decodes a payload received under `command`.
    pub fn from_payload(command: MessageCommand, payload: &[u8]) -> Result<Self> {
        let message = match command {
            MessageCommand::MNB => {
                Self::Broadcast(Role::Masternode, ServiceNodeBroadcast::from_array(payload)?)
            }
            MessageCommand::MNP => {
                Self::Ping(Role::Masternode, ServiceNodePing::from_array(payload)?)
            }
            MessageCommand::SNB => {
                Self::Broadcast(Role::Systemnode, ServiceNodeBroadcast::from_array(payload)?)
            }
            MessageCommand::SNP => {
                Self::Ping(Role::Systemnode, ServiceNodePing::from_array(payload)?)
            }
            other => return Err(NetworkError::UnknownCommand(other.to_string())),
        };
        Ok(message)
    }

    /// Header followed by payload.
    pub fn to_frame(&self, magic: u32) -> Vec<u8> {
        let payload = self.payload();
        let header = MessageHeader::new(magic, self.command(), &payload);
        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&header.to_bytes());
        frame.extend_from_slice(&payload);
        frame
    }

    pub fn from_frame(magic: u32, frame: &[u8]) -> Result<Self> {
        let header = MessageHeader::from_bytes(frame)?;
        let payload = &frame[HEADER_SIZE..];
        header.validate(magic, payload)?;
        Self::from_payload(header.command, payload)
    }
}
