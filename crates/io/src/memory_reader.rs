// Copyright (C) 2014-2026 The Crown Developers.
//
// memory_reader.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Cursor over a borrowed byte slice.

use std::net::{Ipv6Addr, SocketAddr};
use thiserror::Error;

/// IO errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IoError {
    #[error("Unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    EndOfStream { needed: usize, remaining: usize },

    #[error("Value {value} exceeds maximum {max}")]
    TooLarge { value: u64, max: u64 },

    #[error("Non-canonical variable integer encoding")]
    NonCanonicalVarInt,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid UTF-8 string")]
    InvalidUtf8,
}

/// Result type for IO operations
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Reader over a byte slice, mirroring [`crate::BinaryWriter`].
#[derive(Debug)]
pub struct MemoryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> MemoryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, count: usize) -> IoResult<&'a [u8]> {
        if self.remaining() < count {
            return Err(IoError::EndOfStream {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> IoResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> IoResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_bool(&mut self) -> IoResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(IoError::InvalidData(format!("invalid boolean byte {other}"))),
        }
    }

    pub fn read_u16(&mut self) -> IoResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> IoResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> IoResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> IoResult<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Reads a compact-size integer no larger than `max`, rejecting
    /// non-minimal encodings.
    pub fn read_var_int(&mut self, max: u64) -> IoResult<u64> {
        let value = match self.read_u8()? {
            0xFD => {
                let v = u64::from(self.read_u16()?);
                if v < 0xFD {
                    return Err(IoError::NonCanonicalVarInt);
                }
                v
            }
            0xFE => {
                let v = u64::from(self.read_u32()?);
                if v <= 0xFFFF {
                    return Err(IoError::NonCanonicalVarInt);
                }
                v
            }
            0xFF => {
                let v = self.read_u64()?;
                if v <= 0xFFFF_FFFF {
                    return Err(IoError::NonCanonicalVarInt);
                }
                v
            }
            small => u64::from(small),
        };
        if value > max {
            return Err(IoError::TooLarge { value, max });
        }
        Ok(value)
    }

    pub fn read_var_bytes(&mut self, max: usize) -> IoResult<Vec<u8>> {
        let len = self.read_var_int(max as u64)? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }

    pub fn read_var_string(&mut self, max: usize) -> IoResult<String> {
        String::from_utf8(self.read_var_bytes(max)?).map_err(|_| IoError::InvalidUtf8)
    }

    pub fn read_socket_addr(&mut self) -> IoResult<SocketAddr> {
        let octets: [u8; 16] = self.read_array()?;
        let port = u16::from_be_bytes(self.read_array()?);
        let v6 = Ipv6Addr::from(octets);
        let ip = match v6.to_ipv4_mapped() {
            Some(v4) => v4.into(),
            None => v6.into(),
        };
        Ok(SocketAddr::new(ip, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BinaryWriter;

    #[test]
    fn test_end_of_stream() {
        let mut reader = MemoryReader::new(&[1, 2]);
        assert_eq!(
            reader.read_u32(),
            Err(IoError::EndOfStream {
                needed: 4,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_non_canonical_var_int_rejected() {
        let mut reader = MemoryReader::new(&[0xFD, 0x05, 0x00]);
        assert_eq!(reader.read_var_int(u64::MAX), Err(IoError::NonCanonicalVarInt));
    }

    #[test]
    fn test_var_bytes_limit() {
        let mut writer = BinaryWriter::new();
        writer.write_var_bytes(&[0u8; 100]);
        let bytes = writer.into_bytes();
        let mut reader = MemoryReader::new(&bytes);
        assert!(matches!(
            reader.read_var_bytes(65),
            Err(IoError::TooLarge { value: 100, max: 65 })
        ));
    }

    #[test]
    fn test_socket_addr_v4_and_v6() {
        let v4: SocketAddr = "10.0.0.1:19340".parse().unwrap();
        let v6: SocketAddr = "[2001:db8::1]:9340".parse().unwrap();
        let mut writer = BinaryWriter::new();
        writer.write_socket_addr(&v4);
        writer.write_socket_addr(&v6);
        let bytes = writer.into_bytes();

        let mut reader = MemoryReader::new(&bytes);
        assert_eq!(reader.read_socket_addr().unwrap(), v4);
        assert_eq!(reader.read_socket_addr().unwrap(), v6);
        assert!(reader.is_empty());
    }
}
