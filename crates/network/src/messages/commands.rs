// Copyright (C) 2014-2026 The Crown Developers.
//
// commands.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Message command definitions.

use crate::{NetworkError, NetworkResult as Result};
use std::fmt;

/// Network message command (12 bytes, zero-padded)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageCommand([u8; 12]);

impl MessageCommand {
    /// Creates a command from string
    pub fn new(cmd: &str) -> Self {
        let mut bytes = [0u8; 12];
        let cmd_bytes = cmd.as_bytes();
        let len = std::cmp::min(cmd_bytes.len(), 12);
        bytes[..len].copy_from_slice(&cmd_bytes[..len]);
        Self(bytes)
    }

    /// Rebuilds a command from its padded wire form.
    pub fn from_bytes(bytes: [u8; 12]) -> Result<Self> {
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(12);
        if bytes[end..].iter().any(|b| *b != 0) || !bytes[..end].is_ascii() {
            return Err(NetworkError::Protocol(format!(
                "malformed command {}",
                hex::encode(bytes)
            )));
        }
        Ok(Self(bytes))
    }

    /// Masternode broadcast
    pub const MNB: MessageCommand = MessageCommand(*b"mnb\0\0\0\0\0\0\0\0\0");
    /// Masternode ping
    pub const MNP: MessageCommand = MessageCommand(*b"mnp\0\0\0\0\0\0\0\0\0");
    /// Systemnode broadcast
    pub const SNB: MessageCommand = MessageCommand(*b"snb\0\0\0\0\0\0\0\0\0");
    /// Systemnode ping
    pub const SNP: MessageCommand = MessageCommand(*b"snp\0\0\0\0\0\0\0\0\0");

    /// Gets the raw bytes of the command
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

impl fmt::Display for MessageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmd_str = std::str::from_utf8(&self.0)
            .unwrap_or("invalid")
            .trim_end_matches('\0');
        write!(f, "{}", cmd_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_command() {
        assert_eq!(MessageCommand::SNB.to_string(), "snb");
        assert_eq!(MessageCommand::new("mnp"), MessageCommand::MNP);

        // Commands are zero-padded to 12 bytes
        assert_eq!(MessageCommand::MNB.as_bytes().len(), 12);
    }

    #[test]
    fn test_from_bytes_rejects_garbage_after_padding() {
        assert_eq!(
            MessageCommand::from_bytes(*MessageCommand::SNP.as_bytes()).unwrap(),
            MessageCommand::SNP
        );
        let mut bytes = *MessageCommand::SNP.as_bytes();
        bytes[11] = b'x';
        assert!(MessageCommand::from_bytes(bytes).is_err());
    }
}
