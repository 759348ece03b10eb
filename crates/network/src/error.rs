// Copyright (C) 2014-2026 The Crown Developers.
//
// error.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Network error types.

use crown_io::IoError;
use std::net::SocketAddr;
use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = std::result::Result<T, NetworkError>;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Codec error: {0}")]
    Codec(#[from] IoError),

    #[error("Connection to {address} timed out after {timeout_ms} ms")]
    ConnectionTimeout { address: SocketAddr, timeout_ms: u64 },

    #[error("Connection to {address} failed: {reason}")]
    ConnectionFailed { address: SocketAddr, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
