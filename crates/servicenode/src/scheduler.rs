// Copyright (C) 2014-2026 The Crown Developers.
//
// scheduler.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Fixed-cadence driver for both service-node roles.
//!
//! One background task ticks once per period. Per role it keeps an explicit
//! tick counter; the controller runs when `counter % ping_interval` hits
//! the status phase and the registry is cleaned every
//! [`HOUSEKEEPING_INTERVAL_TICKS`] ticks.

use crate::active::ActiveServiceNode;
use crate::registry::{CheckReport, ServiceNodeRegistry};
use crown_config::{
    Role, RoleProfile, HOUSEKEEPING_INTERVAL_TICKS, MANAGE_STATUS_PHASE_TICKS,
    SCHEDULER_TICK_MILLIS,
};
use crown_core::{ChainView, ShutdownSignal};
use crown_network::{SyncOracle, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

/// Periodic cleanup owned by another subsystem (payments, budget votes).
pub trait Housekeeper: Send + Sync {
    fn name(&self) -> &str;

    fn check_and_remove(&self);
}

/// Per-role scheduler state.
pub struct RoleDriver {
    profile: RoleProfile,
    counter: u64,
    controller: Option<ActiveServiceNode>,
    registry: Arc<ServiceNodeRegistry>,
    sync: Arc<dyn SyncOracle>,
    transport: Arc<dyn Transport>,
    housekeepers: Vec<Arc<dyn Housekeeper>>,
}

impl RoleDriver {
    pub fn new(
        registry: Arc<ServiceNodeRegistry>,
        sync: Arc<dyn SyncOracle>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            profile: registry.profile().clone(),
            counter: 0,
            controller: None,
            registry,
            sync,
            transport,
            housekeepers: Vec::new(),
        }
    }

    /// Enables the local node for this role.
    pub fn with_controller(mut self, controller: ActiveServiceNode) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn with_housekeeper(mut self, housekeeper: Arc<dyn Housekeeper>) -> Self {
        self.housekeepers.push(housekeeper);
        self
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn controller(&self) -> Option<&ActiveServiceNode> {
        self.controller.as_ref()
    }

    pub fn registry(&self) -> &Arc<ServiceNodeRegistry> {
        &self.registry
    }

    fn is_manage_tick(&self) -> bool {
        self.counter.checked_rem(self.profile.ping_interval_secs) == Some(MANAGE_STATUS_PHASE_TICKS)
    }

    fn is_housekeeping_tick(&self) -> bool {
        self.counter % HOUSEKEEPING_INTERVAL_TICKS == 0
    }

    fn housekeep(&self) -> CheckReport {
        let report = self.registry.check_and_remove();
        self.transport.maintain_connections(&self.registry.endpoints());
        for housekeeper in &self.housekeepers {
            trace!(role = %self.profile.role, housekeeper = housekeeper.name(), "Housekeeping");
            housekeeper.check_and_remove();
        }
        debug!(
            role = %self.profile.role,
            enabled = report.enabled,
            expired = report.expired,
            removed = report.removed.len(),
            "Checked service node list"
        );
        report
    }
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The whole tick was skipped (import, initial download, shutdown).
    pub skipped: bool,
    /// Roles whose controller ran.
    pub managed: Vec<Role>,
    /// Roles whose registry was cleaned.
    pub housekept: Vec<Role>,
}

pub struct SyncScheduler {
    chain: Arc<dyn ChainView>,
    shutdown: ShutdownSignal,
    period: Duration,
    drivers: Vec<RoleDriver>,
}

impl SyncScheduler {
    pub fn new(chain: Arc<dyn ChainView>, shutdown: ShutdownSignal) -> Self {
        Self {
            chain,
            shutdown,
            period: Duration::from_millis(SCHEDULER_TICK_MILLIS),
            drivers: Vec::new(),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_driver(mut self, driver: RoleDriver) -> Self {
        self.drivers.push(driver);
        self
    }

    pub fn driver(&self, role: Role) -> Option<&RoleDriver> {
        self.drivers.iter().find(|driver| driver.role() == role)
    }

    pub fn drivers(&self) -> &[RoleDriver] {
        &self.drivers
    }

    /// One scheduler step.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.shutdown.is_requested()
            || self.chain.is_importing()
            || self.chain.is_initial_block_download()
        {
            report.skipped = true;
            return report;
        }

        for driver in &self.drivers {
            driver.sync.process();
        }

        for driver in &mut self.drivers {
            if !driver.sync.is_blockchain_synced() {
                continue;
            }
            driver.counter += 1;

            if driver.is_manage_tick() {
                if let Some(controller) = driver.controller.as_mut() {
                    controller.manage_status().await;
                    report.managed.push(driver.profile.role);
                }
            }

            if driver.is_housekeeping_tick() {
                driver.housekeep();
                report.housekept.push(driver.profile.role);
            }
        }
        report
    }

    /// Ticks until shutdown is requested.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let shutdown = self.shutdown.clone();
        info!(period_ms = self.period.as_millis() as u64, "Scheduler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = shutdown.wait() => break,
            }
        }
        info!(reason = ?shutdown.reason(), "Scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::ScriptedSync;
    use crown_config::DEFAULT_SEEN_CACHE_CAPACITY;
    use crown_core::{ManualClock, MemoryChain};
    use crown_network::RecordingTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHousekeeper(AtomicUsize);

    impl Housekeeper for CountingHousekeeper {
        fn name(&self) -> &str {
            "counting"
        }

        fn check_and_remove(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn driver(chain: Arc<MemoryChain>, sync: Arc<ScriptedSync>) -> RoleDriver {
        let registry = Arc::new(ServiceNodeRegistry::new(
            RoleProfile::systemnode(),
            chain,
            Arc::new(ManualClock::new(1_700_000_000)),
            DEFAULT_SEEN_CACHE_CAPACITY,
        ));
        RoleDriver::new(registry, sync, Arc::new(RecordingTransport::default()))
    }

    #[tokio::test]
    async fn test_skips_while_importing() {
        let chain = Arc::new(MemoryChain::new(10));
        let sync = Arc::new(ScriptedSync::synced());
        let mut scheduler = SyncScheduler::new(chain.clone(), ShutdownSignal::new())
            .with_driver(driver(chain.clone(), sync.clone()));

        chain.set_importing(true);
        assert!(scheduler.tick().await.skipped);
        assert_eq!(sync.processed(), 0);

        chain.set_importing(false);
        assert!(!scheduler.tick().await.skipped);
        assert_eq!(sync.processed(), 1);
        assert_eq!(scheduler.driver(Role::Systemnode).map(RoleDriver::counter), Some(1));
    }

    #[tokio::test]
    async fn test_counter_waits_for_blockchain_sync() {
        let chain = Arc::new(MemoryChain::new(10));
        let sync = Arc::new(ScriptedSync::default());
        let mut scheduler = SyncScheduler::new(chain.clone(), ShutdownSignal::new())
            .with_driver(driver(chain, sync.clone()));

        for _ in 0..5 {
            scheduler.tick().await;
        }
        assert_eq!(sync.processed(), 5);
        assert_eq!(scheduler.drivers()[0].counter(), 0);
    }

    #[tokio::test]
    async fn test_housekeepers_run_every_minute() {
        let chain = Arc::new(MemoryChain::new(10));
        let sync = Arc::new(ScriptedSync::synced());
        let housekeeper = Arc::new(CountingHousekeeper::default());
        let mut scheduler = SyncScheduler::new(chain.clone(), ShutdownSignal::new())
            .with_driver(driver(chain, sync).with_housekeeper(housekeeper.clone()));

        for _ in 0..120 {
            scheduler.tick().await;
        }
        assert_eq!(housekeeper.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shutdown_skips_and_stops_run() {
        let chain = Arc::new(MemoryChain::new(10));
        let shutdown = ShutdownSignal::new();
        let scheduler = SyncScheduler::new(chain.clone(), shutdown.clone())
            .with_period(Duration::from_millis(5))
            .with_driver(driver(chain, Arc::new(ScriptedSync::synced())));

        let task = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.request("test");
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("scheduler did not stop")
            .expect("scheduler panicked");
    }
}
