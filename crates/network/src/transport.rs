// Copyright (C) 2014-2026 The Crown Developers.
//
// transport.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Peer transport used by the service-node layer.
//!
//! Relaying is fire-and-forget: frames are pushed onto a broadcast channel
//! and one forwarding task per known peer writes them out, each write
//! bounded by the configured timeout.

use crate::{messages::HEADER_SIZE, MessageHeader, NetworkError, NetworkResult, ServiceNodeMessage};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Capacity of the outbound relay queue
pub const RELAY_QUEUE_SIZE: usize = 1000;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens and immediately closes a connection; `true` if it succeeded
    /// within `timeout`.
    async fn connect(&self, endpoint: SocketAddr, timeout: Duration) -> bool;

    /// Queues `message` for every connected peer.
    fn relay(&self, message: &ServiceNodeMessage);

    /// Externally reachable address of this process, if known.
    fn local_endpoint(&self) -> Option<SocketAddr>;

    /// Keeps connections open to the given service-node endpoints.
    fn maintain_connections(&self, known: &[SocketAddr]);
}

/// TCP transport.
pub struct TcpTransport {
    magic: u32,
    local_endpoint: Option<SocketAddr>,
    write_timeout: Duration,
    relay_tx: broadcast::Sender<Arc<Vec<u8>>>,
    peers: Mutex<HashMap<SocketAddr, JoinHandle<()>>>,
    relayed: AtomicU64,
}

impl TcpTransport {
    pub fn new(magic: u32, local_endpoint: Option<SocketAddr>, write_timeout: Duration) -> Self {
        let (relay_tx, _) = broadcast::channel(RELAY_QUEUE_SIZE);
        Self {
            magic,
            local_endpoint,
            write_timeout,
            relay_tx,
            peers: Mutex::new(HashMap::new()),
            relayed: AtomicU64::new(0),
        }
    }

    /// Frames relayed so far.
    pub fn relayed_count(&self) -> u64 {
        self.relayed.load(Ordering::Relaxed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Vec<u8>>> {
        self.relay_tx.subscribe()
    }

    pub fn connected_peers(&self) -> Vec<SocketAddr> {
        let mut peers: Vec<_> = self.peers.lock().keys().copied().collect();
        peers.sort();
        peers
    }

    fn spawn_forwarder(&self, address: SocketAddr) -> Option<JoinHandle<()>> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        let mut frames = self.relay_tx.subscribe();
        let write_timeout = self.write_timeout;
        Some(handle.spawn(async move {
            let mut stream = match timeout(write_timeout, TcpStream::connect(address)).await {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => {
                    debug!("Failed to connect to service node {}: {}", address, e);
                    return;
                }
                Err(_) => {
                    debug!("Connection to service node {} timed out", address);
                    return;
                }
            };
            debug!("Forwarding service-node messages to {}", address);
            loop {
                let frame = match frames.recv().await {
                    Ok(frame) => frame,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Peer {} lagged, {} frames dropped", address, skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                };
                match timeout(write_timeout, stream.write_all(&frame)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        debug!("Write to {} failed: {}", address, e);
                        return;
                    }
                    Err(_) => {
                        debug!("Write to {} timed out", address);
                        return;
                    }
                }
            }
        }))
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self, endpoint: SocketAddr, connect_timeout: Duration) -> bool {
        match timeout(connect_timeout, TcpStream::connect(endpoint)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                debug!("Probe of {} failed: {}", endpoint, e);
                false
            }
            Err(_) => {
                debug!(
                    "Probe of {} timed out after {} ms",
                    endpoint,
                    connect_timeout.as_millis()
                );
                false
            }
        }
    }

    fn relay(&self, message: &ServiceNodeMessage) {
        let frame = Arc::new(message.to_frame(self.magic));
        self.relayed.fetch_add(1, Ordering::Relaxed);
        // No subscribers just means no peers yet.
        let receivers = self.relay_tx.send(frame).unwrap_or(0);
        debug!(
            "Relayed {} {} to {} peers",
            message.command(),
            message.hash(),
            receivers
        );
    }

    fn local_endpoint(&self) -> Option<SocketAddr> {
        self.local_endpoint
    }

    fn maintain_connections(&self, known: &[SocketAddr]) {
        let mut peers = self.peers.lock();
        peers.retain(|address, task| {
            let keep = !task.is_finished() && known.contains(address);
            if !keep {
                task.abort();
            }
            keep
        });
        for address in known {
            if peers.contains_key(address) || Some(*address) == self.local_endpoint {
                continue;
            }
            if let Some(task) = self.spawn_forwarder(*address) {
                peers.insert(*address, task);
            }
        }
        debug!("Maintaining {} service-node connections", peers.len());
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        for (_, task) in self.peers.lock().drain() {
            task.abort();
        }
    }
}

/// Reads one frame from `stream` and decodes it.
pub async fn read_message(stream: &mut TcpStream, magic: u32) -> NetworkResult<ServiceNodeMessage> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    stream.read_exact(&mut header_bytes).await?;
    let header = MessageHeader::from_bytes(&header_bytes)?;
    if header.length as usize > crate::messages::MAX_MESSAGE_SIZE {
        return Err(NetworkError::Protocol(format!(
            "Message too large: {} bytes",
            header.length
        )));
    }
    let mut payload = vec![0u8; header.length as usize];
    stream.read_exact(&mut payload).await?;
    header.validate(magic, &payload)?;
    ServiceNodeMessage::from_payload(header.command, &payload)
}

/// Accepts peers on `listener` and forwards every decoded message to
/// `sink` until the sink is closed.
pub async fn accept_messages(
    listener: TcpListener,
    magic: u32,
    sink: mpsc::Sender<(SocketAddr, ServiceNodeMessage)>,
) {
    loop {
        let (mut stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        if sink.is_closed() {
            return;
        }
        info!("Accepted service-node peer {}", peer);
        let sink = sink.clone();
        tokio::spawn(async move {
            loop {
                match read_message(&mut stream, magic).await {
                    Ok(message) => {
                        if sink.send((peer, message)).await.is_err() {
                            return;
                        }
                    }
                    Err(NetworkError::Io(e)) => {
                        debug!("Peer {} disconnected: {}", peer, e);
                        return;
                    }
                    Err(e) => {
                        warn!("Dropping peer {} after bad message: {}", peer, e);
                        return;
                    }
                }
            }
        });
    }
}

/// Transport that records relays instead of sending them.
#[derive(Default)]
pub struct RecordingTransport {
    reachable: Mutex<bool>,
    local_endpoint: Mutex<Option<SocketAddr>>,
    relayed: Mutex<Vec<ServiceNodeMessage>>,
    probes: Mutex<Vec<SocketAddr>>,
    maintained: Mutex<Vec<Vec<SocketAddr>>>,
}

impl RecordingTransport {
    /// A transport whose probes succeed.
    pub fn reachable() -> Self {
        let transport = Self::default();
        transport.set_reachable(true);
        transport
    }

    pub fn set_reachable(&self, reachable: bool) {
        *self.reachable.lock() = reachable;
    }

    pub fn set_local_endpoint(&self, endpoint: Option<SocketAddr>) {
        *self.local_endpoint.lock() = endpoint;
    }

    pub fn relayed(&self) -> Vec<ServiceNodeMessage> {
        self.relayed.lock().clone()
    }

    pub fn probes(&self) -> Vec<SocketAddr> {
        self.probes.lock().clone()
    }

    pub fn maintenance_rounds(&self) -> usize {
        self.maintained.lock().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn connect(&self, endpoint: SocketAddr, _timeout: Duration) -> bool {
        self.probes.lock().push(endpoint);
        *self.reachable.lock()
    }

    fn relay(&self, message: &ServiceNodeMessage) {
        self.relayed.lock().push(message.clone());
    }

    fn local_endpoint(&self) -> Option<SocketAddr> {
        *self.local_endpoint.lock()
    }

    fn maintain_connections(&self, known: &[SocketAddr]) {
        self.maintained.lock().push(known.to_vec());
    }
}
