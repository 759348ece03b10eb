// Copyright (C) 2014-2026 The Crown Developers.
//
// serializable.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Serialization traits and utilities for Crown objects.

use crate::{BinaryWriter, IoResult, MemoryReader};

/// Objects with a canonical binary encoding.
pub trait Serializable {
    /// The size of the object in bytes after serialization.
    fn size(&self) -> usize;

    fn serialize(&self, writer: &mut BinaryWriter);

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self>
    where
        Self: Sized;
}

/// Extension methods for serializable objects.
pub trait SerializableExt: Serializable {
    /// Converts the object to a byte array.
    fn to_array(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::with_capacity(self.size());
        self.serialize(&mut writer);
        writer.into_bytes()
    }

    /// Creates an object from a byte array, rejecting trailing bytes.
    fn from_array(data: &[u8]) -> IoResult<Self>
    where
        Self: Sized,
    {
        let mut reader = MemoryReader::new(data);
        let value = Self::deserialize(&mut reader)?;
        if !reader.is_empty() {
            return Err(crate::IoError::InvalidData(format!(
                "{} trailing bytes",
                reader.remaining()
            )));
        }
        Ok(value)
    }
}

impl<T: Serializable> SerializableExt for T {}

/// Helper functions for serialization.
pub mod helper {
    /// Gets the size of a variable-length integer.
    pub fn get_var_size(value: u64) -> usize {
        if value < 0xFD {
            1
        } else if value <= 0xFFFF {
            3
        } else if value <= 0xFFFFFFFF {
            5
        } else {
            9
        }
    }

    /// Size of a length-prefixed byte string.
    pub fn get_var_bytes_size(len: usize) -> usize {
        get_var_size(len as u64) + len
    }
}
