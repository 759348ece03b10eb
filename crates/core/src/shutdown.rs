// Copyright (C) 2014-2026 The Crown Developers.
//
// shutdown.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Process-wide shutdown flag.
//!
//! The scheduler checks it before every tick and blocking probes race
//! against [`ShutdownSignal::wait`], so a requested shutdown abandons the
//! current tick without further side effects.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    reason: Mutex<Option<String>>,
    notify: Notify,
}

/// Cloneable handle to the shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Returns `false` if it had already been requested.
    pub fn request(&self, reason: impl Into<String>) -> bool {
        if self.inner.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        let reason = reason.into();
        info!("🛑 Shutdown requested: {}", reason);
        *self.inner.reason.lock() = Some(reason);
        self.inner.notify.notify_waiters();
        true
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    pub fn reason(&self) -> Option<String> {
        self.inner.reason.lock().clone()
    }

    /// Resolves once shutdown has been requested.
    pub async fn wait(&self) {
        let notified = self.inner.notify.notified();
        if self.is_requested() {
            return;
        }
        notified.await;
    }
}
