// Copyright (C) 2014-2026 The Crown Developers.
//
// scheduler_tests.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Scheduler cadence with a real controller attached.

mod common;

use common::Harness;
use crown_config::{Role, RoleProfile};
use crown_network::ServiceNodeMessage;
use crown_servicenode::*;
use std::sync::Arc;

fn fast_profile() -> RoleProfile {
    RoleProfile {
        ping_interval_secs: 60,
        ..RoleProfile::systemnode()
    }
}

#[tokio::test]
async fn test_phase_over_three_minutes() {
    let h = Harness::new(fast_profile());
    h.fund(20);
    let driver = RoleDriver::new(h.registry.clone(), h.sync.clone(), h.transport.clone())
        .with_controller(h.testnet_controller());
    let mut scheduler =
        SyncScheduler::new(h.chain.clone(), h.shutdown.clone()).with_driver(driver);

    let mut managed = Vec::new();
    let mut housekept = Vec::new();
    for tick in 1..=180u64 {
        h.clock.advance(1);
        let report = scheduler.tick().await;
        assert!(!report.skipped);
        if report.managed.contains(&Role::Systemnode) {
            managed.push(tick);
        }
        if report.housekept.contains(&Role::Systemnode) {
            housekept.push(tick);
        }
    }

    assert_eq!(managed, vec![15, 75, 135]);
    assert_eq!(housekept, vec![60, 120, 180]);
    assert_eq!(h.transport.maintenance_rounds(), 3);

    // Registration at 15, then one ping per minute.
    let relayed = h.transport.relayed();
    assert_eq!(relayed.len(), 3);
    assert!(matches!(relayed[0], ServiceNodeMessage::Broadcast(..)));
    assert!(matches!(relayed[1], ServiceNodeMessage::Ping(..)));
    assert!(matches!(relayed[2], ServiceNodeMessage::Ping(..)));

    let status = scheduler
        .driver(Role::Systemnode)
        .and_then(RoleDriver::controller)
        .map(ActiveServiceNode::status);
    assert_eq!(status, Some(ActiveStatus::Started));
}

#[tokio::test]
async fn test_role_without_controller_still_housekeeps() {
    let h = Harness::new(fast_profile());
    let driver = RoleDriver::new(h.registry.clone(), h.sync.clone(), h.transport.clone());
    let mut scheduler =
        SyncScheduler::new(h.chain.clone(), h.shutdown.clone()).with_driver(driver);

    let mut managed = 0;
    for _ in 0..120 {
        managed += scheduler.tick().await.managed.len();
    }
    assert_eq!(managed, 0);
    assert_eq!(h.transport.maintenance_rounds(), 2);
    assert!(h.transport.relayed().is_empty());
}

#[tokio::test]
async fn test_initial_download_pauses_everything() {
    let h = Harness::new(fast_profile());
    h.fund(20);
    let driver = RoleDriver::new(h.registry.clone(), h.sync.clone(), h.transport.clone())
        .with_controller(h.testnet_controller());
    let mut scheduler =
        SyncScheduler::new(h.chain.clone(), h.shutdown.clone()).with_driver(driver);

    h.chain.set_initial_download(true);
    for _ in 0..30 {
        assert!(scheduler.tick().await.skipped);
    }
    assert_eq!(h.sync.processed(), 0);
    assert_eq!(scheduler.drivers()[0].counter(), 0);

    h.chain.set_initial_download(false);
    for _ in 0..15 {
        scheduler.tick().await;
    }
    assert_eq!(h.transport.relayed().len(), 1);
}

#[tokio::test]
async fn test_controller_waits_for_roster_sync() {
    let h = Harness::new(fast_profile());
    h.fund(20);
    let sync = Arc::new(ServiceNodeSync::new(
        "systemnode",
        h.chain.clone(),
        h.clock.clone(),
        SyncTimings::default(),
    ));
    let controller = ActiveServiceNode::new(
        h.profile.clone(),
        h.settings(crown_config::NetworkType::TestNet, "10.0.0.1:19999"),
        h.node_key.clone(),
        ActiveContext {
            wallet: h.wallet.clone(),
            sync: sync.clone(),
            transport: h.transport.clone(),
            registry: h.registry.clone(),
            clock: h.clock.clone(),
            shutdown: h.shutdown.clone(),
        },
    );
    let driver = RoleDriver::new(h.registry.clone(), sync.clone(), h.transport.clone())
        .with_controller(controller);
    let mut scheduler =
        SyncScheduler::new(h.chain.clone(), h.shutdown.clone()).with_driver(driver);

    let status = |scheduler: &SyncScheduler| {
        scheduler
            .driver(Role::Systemnode)
            .and_then(RoleDriver::controller)
            .map(ActiveServiceNode::status)
    };

    let mut statuses = Vec::new();
    for _ in 0..200 {
        h.clock.advance(1);
        if !scheduler.tick().await.managed.is_empty() {
            statuses.push(status(&scheduler));
        }
    }

    // The first status phase falls inside the quiet period of the list
    // stage; the next one registers.
    assert_eq!(statuses[0], Some(ActiveStatus::SyncInProgress));
    assert_eq!(statuses[1], Some(ActiveStatus::Started));
    assert_eq!(sync.stage(), SyncStage::Finished);
}
