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

//! Crown.IO
//!
//! Little-endian binary encoding shared by everything that is hashed,
//! signed or put on the wire. Variable-length integers use the compact-size
//! scheme (`0xfd`/`0xfe`/`0xff` prefixes).

mod binary_writer;
mod memory_reader;
mod serializable;

pub use binary_writer::BinaryWriter;
pub use memory_reader::{IoError, IoResult, MemoryReader};
pub use serializable::{helper, Serializable, SerializableExt};
