// Copyright (C) 2014-2026 The Crown Developers.
//
// router.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Inbound message dispatch.

use crate::error::ProtocolError;
use crate::protocol::{ProcessOutcome, ProtocolResult, ServiceNodeProtocol};
use crate::sync::ServiceNodeSync;
use crown_config::Role;
use crown_core::ShutdownSignal;
use crown_network::ServiceNodeMessage;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct RoleRoute {
    protocol: Arc<ServiceNodeProtocol>,
    sync: Option<Arc<ServiceNodeSync>>,
}

/// Routes `mnb`/`mnp`/`snb`/`snp` messages to the protocol handler of
/// their role.
#[derive(Default)]
pub struct ServiceNodeRouter {
    masternode: Option<RoleRoute>,
    systemnode: Option<RoleRoute>,
}

impl ServiceNodeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles messages of `role` with `protocol`. Accepted traffic is
    /// reported to `sync` so the list stage waits for the roster to go
    /// quiet.
    pub fn with_role(
        mut self,
        protocol: Arc<ServiceNodeProtocol>,
        sync: Option<Arc<ServiceNodeSync>>,
    ) -> Self {
        let route = RoleRoute { protocol, sync };
        match route.protocol.registry().role() {
            Role::Masternode => self.masternode = Some(route),
            Role::Systemnode => self.systemnode = Some(route),
        }
        self
    }

    fn route(&self, role: Role) -> Option<&RoleRoute> {
        match role {
            Role::Masternode => self.masternode.as_ref(),
            Role::Systemnode => self.systemnode.as_ref(),
        }
    }

    pub fn dispatch(&self, message: &ServiceNodeMessage) -> ProtocolResult<ProcessOutcome> {
        let role = message.role();
        let route = self.route(role).ok_or(ProtocolError::RoleDisabled(role))?;
        let outcome = match message {
            ServiceNodeMessage::Broadcast(_, broadcast) => {
                route.protocol.process_broadcast(broadcast)?
            }
            ServiceNodeMessage::Ping(_, ping) => route.protocol.process_ping(ping)?,
        };
        if outcome.is_relayed() {
            if let Some(sync) = &route.sync {
                sync.record_activity();
            }
        }
        Ok(outcome)
    }

    /// Drains inbound messages until the channel closes or shutdown is
    /// requested.
    pub async fn run(
        self,
        mut inbound: mpsc::Receiver<(SocketAddr, ServiceNodeMessage)>,
        shutdown: ShutdownSignal,
    ) {
        loop {
            tokio::select! {
                received = inbound.recv() => {
                    let Some((peer, message)) = received else {
                        break;
                    };
                    match self.dispatch(&message) {
                        Ok(outcome) => debug!(
                            peer = %peer,
                            command = %message.command(),
                            ?outcome,
                            "Processed message"
                        ),
                        Err(e) => warn!(
                            peer = %peer,
                            command = %message.command(),
                            "Rejected message: {}",
                            e
                        ),
                    }
                }
                _ = shutdown.wait() => break,
            }
        }
        info!("Message router stopped");
    }
}
