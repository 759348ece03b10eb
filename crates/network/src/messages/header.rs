// Copyright (C) 2014-2026 The Crown Developers.
//
// header.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Message header structure.

use super::{commands::MessageCommand, MAX_MESSAGE_SIZE};
use crate::{NetworkError, NetworkResult as Result};
use crown_cryptography::hash256;

/// Size of an encoded header.
pub const HEADER_SIZE: usize = 24;

/// Network message header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    /// Network magic number (4 bytes)
    pub magic: u32,
    /// Command string (12 bytes, zero-padded)
    pub command: MessageCommand,
    /// Payload length (4 bytes)
    pub length: u32,
    /// First four bytes of hash256(payload)
    pub checksum: u32,
}

impl MessageHeader {
    pub fn new(magic: u32, command: MessageCommand, payload: &[u8]) -> Self {
        Self {
            magic,
            command,
            length: payload.len() as u32,
            checksum: Self::calculate_checksum(payload),
        }
    }

    fn calculate_checksum(payload: &[u8]) -> u32 {
        let hash = hash256(payload);
        let bytes = hash.as_bytes();
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Validates the header against the network magic and its payload.
    pub fn validate(&self, magic: u32, payload: &[u8]) -> Result<()> {
        if self.magic != magic {
            return Err(NetworkError::Protocol(format!(
                "Wrong network magic: expected 0x{:08x}, got 0x{:08x}",
                magic, self.magic
            )));
        }

        if self.length as usize != payload.len() {
            return Err(NetworkError::Protocol(format!(
                "Invalid payload length: expected {}, got {}",
                self.length,
                payload.len()
            )));
        }

        if self.length as usize > MAX_MESSAGE_SIZE {
            return Err(NetworkError::Protocol(format!(
                "Message too large: {} bytes (max: {})",
                self.length, MAX_MESSAGE_SIZE
            )));
        }

        let expected_checksum = Self::calculate_checksum(payload);
        if self.checksum != expected_checksum {
            return Err(NetworkError::Protocol(format!(
                "Invalid checksum: expected 0x{:08x}, got 0x{:08x}",
                expected_checksum, self.checksum
            )));
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..16].copy_from_slice(self.command.as_bytes());
        bytes[16..20].copy_from_slice(&self.length.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(NetworkError::Protocol("Header too short".to_string()));
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

        let mut command_bytes = [0u8; 12];
        command_bytes.copy_from_slice(&bytes[4..16]);
        let command = MessageCommand::from_bytes(command_bytes)?;

        let length = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let checksum = u32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);

        Ok(Self {
            magic,
            command,
            length,
            checksum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_header() {
        let magic = 0xb6d4_b8ca;
        let payload = b"test payload";

        let header = MessageHeader::new(magic, MessageCommand::SNP, payload);
        assert_eq!(header.length, payload.len() as u32);
        assert!(header.validate(magic, payload).is_ok());

        let decoded = MessageHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_header_validation_failures() {
        let header = MessageHeader::new(1, MessageCommand::MNB, b"abc");
        assert!(header.validate(2, b"abc").is_err());
        assert!(header.validate(1, b"abd").is_err());
        assert!(header.validate(1, b"abcd").is_err());
        assert!(MessageHeader::from_bytes(&[0u8; 10]).is_err());
    }
}
