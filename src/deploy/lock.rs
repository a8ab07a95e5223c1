// ABOUTME: Per-unit mutual exclusion for pipeline runs.
// ABOUTME: A second redeploy of a busy unit fails fast instead of queueing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;

use crate::types::UnitId;

use super::error::PipelineError;

/// Who holds a unit lock, for the conflict error and for logs.
#[derive(Debug, Clone, Serialize)]
pub struct LockInfo {
    /// Hostname of the daemon process holding the lock.
    pub host: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

impl LockInfo {
    fn new() -> Self {
        Self {
            host: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "held by {} pid {} since {}",
            self.host, self.pid, self.started_at
        )
    }
}

#[derive(Debug)]
struct Slot {
    lock: Arc<tokio::sync::Mutex<()>>,
    holder: Option<LockInfo>,
}

impl Slot {
    fn new() -> Self {
        Self {
            lock: Arc::new(tokio::sync::Mutex::new(())),
            holder: None,
        }
    }
}

/// Table of per-unit locks. Different units redeploy concurrently;
/// the same unit never overlaps with itself.
#[derive(Debug, Default)]
pub(crate) struct UnitLocks {
    slots: Mutex<HashMap<UnitId, Slot>>,
}

impl UnitLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock for `unit` without waiting. A held lock is an
    /// immediate `Busy` carrying the holder's info, not a queue position
    /// behind a pipeline that may run for minutes.
    pub(crate) fn acquire(self: &Arc<Self>, unit: &UnitId) -> Result<UnitGuard, PipelineError> {
        let mut slots = self.slots.lock();
        let slot = slots.entry(unit.clone()).or_insert_with(Slot::new);

        match slot.lock.clone().try_lock_owned() {
            Ok(guard) => {
                slot.holder = Some(LockInfo::new());
                Ok(UnitGuard {
                    locks: Arc::clone(self),
                    unit: unit.clone(),
                    _guard: guard,
                })
            }
            Err(_) => {
                let holder = slot.holder.clone().unwrap_or_else(LockInfo::new);
                Err(PipelineError::Busy {
                    unit: unit.to_string(),
                    holder,
                })
            }
        }
    }
}

/// Held unit lock; releasing clears the holder record.
#[derive(Debug)]
pub(crate) struct UnitGuard {
    locks: Arc<UnitLocks>,
    unit: UnitId,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for UnitGuard {
    fn drop(&mut self) {
        if let Some(slot) = self.locks.slots.lock().get_mut(&self.unit) {
            slot.holder = None;
        }
    }
}
