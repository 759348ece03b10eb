// Copyright (C) 2014-2026 The Crown Developers.
//
// uint160.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! 160-bit hash value, used as the identity of a public key.

use crate::{CoreError, CoreResult};
use crown_config::ADDRESS_SIZE;
use crown_io::{BinaryWriter, IoResult, MemoryReader, Serializable};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UInt160([u8; ADDRESS_SIZE]);

impl UInt160 {
    pub const fn zero() -> Self {
        Self([0u8; ADDRESS_SIZE])
    }

    pub const fn from_bytes(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> CoreResult<Self> {
        let array: [u8; ADDRESS_SIZE] =
            bytes.try_into().map_err(|_| CoreError::InvalidLength {
                expected: ADDRESS_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }
}

impl fmt::Display for UInt160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for UInt160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UInt160({self})")
    }
}

impl Serializable for UInt160 {
    fn size(&self) -> usize {
        ADDRESS_SIZE
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_bytes(&self.0);
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        Ok(Self(reader.read_array()?))
    }
}
