// Copyright (C) 2014-2026 The Crown Developers.
//
// outpoint.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Reference to a transaction output.

use crate::UInt256;
use crown_io::{BinaryWriter, IoResult, MemoryReader, Serializable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A transaction output, identified by the funding transaction and the
/// output index. Service nodes are identified by their collateral outpoint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: UInt256,
    pub index: u32,
}

impl OutPoint {
    pub fn new(txid: UInt256, index: u32) -> Self {
        Self { txid, index }
    }

    pub fn is_null(&self) -> bool {
        self.txid.is_zero() && self.index == u32::MAX
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.txid, self.index)
    }
}

impl fmt::Debug for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutPoint({self})")
    }
}

impl Serializable for OutPoint {
    fn size(&self) -> usize {
        self.txid.size() + 4
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        Serializable::serialize(&self.txid, writer);
        writer.write_u32(self.index);
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        Ok(Self {
            txid: <UInt256 as Serializable>::deserialize(reader)?,
            index: reader.read_u32()?,
        })
    }
}
