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

//! IO integration tests

use crown_io::{BinaryWriter, IoResult, MemoryReader, Serializable, SerializableExt};

#[derive(Debug, Clone, PartialEq)]
struct Announcement {
    version: u32,
    addr: std::net::SocketAddr,
    key: Vec<u8>,
    time: i64,
    note: String,
}

impl Serializable for Announcement {
    fn size(&self) -> usize {
        4 + 18 + 1 + self.key.len() + 8 + 1 + self.note.len()
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.version);
        writer.write_socket_addr(&self.addr);
        writer.write_var_bytes(&self.key);
        writer.write_i64(self.time);
        writer.write_var_string(&self.note);
    }

    fn deserialize(reader: &mut MemoryReader) -> IoResult<Self> {
        Ok(Self {
            version: reader.read_u32()?,
            addr: reader.read_socket_addr()?,
            key: reader.read_var_bytes(65)?,
            time: reader.read_i64()?,
            note: reader.read_var_string(256)?,
        })
    }
}

#[test]
fn test_structured_message_workflow() {
    let original = Announcement {
        version: 70092,
        addr: "192.168.1.20:19340".parse().unwrap(),
        key: vec![0x02; 33],
        time: 1_700_000_000,
        note: "hello".to_string(),
    };

    let bytes = original.to_array();
    assert_eq!(bytes.len(), original.size());
    assert_eq!(hex::encode(&bytes[0..4]), "cc110100");

    let decoded = Announcement::from_array(&bytes).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_truncated_message_fails() {
    let original = Announcement {
        version: 1,
        addr: "127.0.0.1:1".parse().unwrap(),
        key: vec![1, 2, 3],
        time: -5,
        note: String::new(),
    };
    let bytes = original.to_array();
    assert!(Announcement::from_array(&bytes[..bytes.len() - 1]).is_err());
}
