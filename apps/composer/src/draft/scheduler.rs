//! Debounced draft writer.
//!
//! Every `schedule` restarts the timer and bumps a generation counter. When a
//! timer fires, the write runs under a mutex and is skipped if a newer
//! generation has been scheduled (or cancelled) since. The last edit always wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::draft::{DraftError, DraftKey, DraftSnapshot, DraftStore};

struct Shared {
    generation: AtomicU64,
    write_lock: Mutex<()>,
}

struct Pending {
    handle: JoinHandle<()>,
    snapshot: DraftSnapshot,
    generation: u64,
}

pub struct DraftScheduler {
    store: DraftStore,
    key: DraftKey,
    debounce: Duration,
    shared: Arc<Shared>,
    pending: Option<Pending>,
    suspended: bool,
}

impl DraftScheduler {
    pub fn new(store: DraftStore, key: DraftKey, debounce: Duration) -> Self {
        Self {
            store,
            key,
            debounce,
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                write_lock: Mutex::new(()),
            }),
            pending: None,
            suspended: false,
        }
    }

    pub fn key(&self) -> &DraftKey {
        &self.key
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Restarts the debounce timer with `snapshot`. Dropped while suspended.
    pub fn schedule(&mut self, snapshot: DraftSnapshot) {
        if self.suspended {
            debug!(key = %self.key, "Draft schedule dropped while suspended");
            return;
        }
        self.abort_timer();

        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let handle = tokio::spawn(write_after(
            self.debounce,
            self.store.clone(),
            self.key,
            Arc::clone(&self.shared),
            generation,
            snapshot.clone(),
        ));
        self.pending = Some(Pending {
            handle,
            snapshot,
            generation,
        });
    }

    /// Drops any pending write. A write already past its timer is skipped too.
    pub fn cancel(&mut self) {
        self.abort_timer();
        self.pending = None;
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Writes the pending snapshot now instead of waiting for the timer.
    pub async fn flush(&mut self) -> Result<(), DraftError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        if pending.handle.is_finished() {
            return Ok(());
        }
        pending.handle.abort();
        write_if_current(
            &self.store,
            &self.key,
            &self.shared,
            pending.generation,
            &pending.snapshot,
        )
        .await
    }

    /// Cancels pending writes and deletes the stored draft. Any write already
    /// holding the lock finishes first, so nothing lands after the delete.
    pub async fn clear(&mut self) -> Result<(), DraftError> {
        self.cancel();
        let _guard = self.shared.write_lock.lock().await;
        self.store.clear(&self.key).await
    }

    /// Stops accepting schedules. A write that is still waiting on its timer is
    /// sent immediately so edits made before suspension are kept.
    pub fn suspend(&mut self) {
        if let Some(pending) = self.pending.take() {
            if !pending.handle.is_finished() {
                pending.handle.abort();
                tokio::spawn(write_after(
                    Duration::ZERO,
                    self.store.clone(),
                    self.key,
                    Arc::clone(&self.shared),
                    pending.generation,
                    pending.snapshot,
                ));
            }
        }
        self.suspended = true;
        debug!(key = %self.key, "Draft writes suspended");
    }

    pub fn resume(&mut self) {
        self.suspended = false;
        debug!(key = %self.key, "Draft writes resumed");
    }

    fn abort_timer(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

impl Drop for DraftScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn write_after(
    delay: Duration,
    store: DraftStore,
    key: DraftKey,
    shared: Arc<Shared>,
    generation: u64,
    snapshot: DraftSnapshot,
) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    if let Err(e) = write_if_current(&store, &key, &shared, generation, &snapshot).await {
        warn!(%key, error = %e, "Draft write failed");
    }
}

async fn write_if_current(
    store: &DraftStore,
    key: &DraftKey,
    shared: &Shared,
    generation: u64,
    snapshot: &DraftSnapshot,
) -> Result<(), DraftError> {
    let _guard = shared.write_lock.lock().await;
    let latest = shared.generation.load(Ordering::Acquire);
    if generation != latest {
        debug!(%key, generation, latest, "Skipping stale draft write");
        return Ok(());
    }
    store.save(key, snapshot).await
}
