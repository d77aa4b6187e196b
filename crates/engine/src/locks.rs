// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-muppet operation serialisation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per muppet name.
///
/// Operations on the same name queue behind each other; different names
/// never contend. Entries nobody holds or waits on are pruned on the next
/// acquisition.
#[derive(Default)]
pub struct MuppetLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl MuppetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock();
            slots.retain(|key, slot| key == name || Arc::strong_count(slot) > 1);
            slots.entry(name.to_string()).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Whether an operation currently holds `name`.
    pub fn is_locked(&self, name: &str) -> bool {
        self.slots.lock().get(name).is_some_and(|slot| slot.try_lock().is_err())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.slots.lock().len()
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
