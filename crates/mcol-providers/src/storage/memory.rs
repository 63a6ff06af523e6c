//! In-memory metric storage
//!
//! Two maps behind one map-level lock, optionally persisted to a snapshot
//! file. The snapshot policy decides when the file is rewritten:
//!
//! - [`SnapshotPolicy::Immediate`] after every successful write
//! - [`SnapshotPolicy::Periodic`] by a ticker task started with
//!   [`InMemoryRepository::spawn_background`]
//! - [`SnapshotPolicy::Disabled`] never; the engine is pure memory

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use mcol_domain::error::{Error, Result};
use mcol_domain::repositories::MetricRepository;
use mcol_domain::{MetricKind, MetricListing, MetricValue, Metrics};
use mcol_infrastructure::ShutdownCoordinator;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use super::snapshot::{Snapshot, SnapshotFile};
use crate::constants::CHANGE_CHANNEL_CAPACITY;

/// When the snapshot file is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPolicy {
    /// No snapshot file
    Disabled,
    /// Rewrite after every successful write
    Immediate,
    /// Rewrite on a fixed period
    Periodic(Duration),
}

impl SnapshotPolicy {
    /// Policy for a store interval; zero means immediate
    pub fn from_interval(interval: Duration, file: Option<&SnapshotFile>) -> Self {
        match file {
            None => Self::Disabled,
            Some(_) if interval.is_zero() => Self::Immediate,
            Some(_) => Self::Periodic(interval),
        }
    }
}

/// In-memory metric repository
pub struct InMemoryRepository {
    state: RwLock<Snapshot>,
    file: Option<SnapshotFile>,
    policy: SnapshotPolicy,
    changes: mpsc::Sender<()>,
    change_drain: Mutex<Option<mpsc::Receiver<()>>>,
    dump_lock: tokio::sync::Mutex<()>,
}

impl InMemoryRepository {
    /// Pure memory engine without a snapshot file
    pub fn new() -> Self {
        Self::with_snapshot(None, Duration::ZERO)
    }

    /// Engine persisted to `file` according to `interval`
    pub fn with_snapshot(file: Option<SnapshotFile>, interval: Duration) -> Self {
        let policy = SnapshotPolicy::from_interval(interval, file.as_ref());
        let (changes, change_drain) = mpsc::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(Snapshot::default()),
            file,
            policy,
            changes,
            change_drain: Mutex::new(Some(change_drain)),
            dump_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn policy(&self) -> SnapshotPolicy {
        self.policy
    }

    pub fn snapshot_file(&self) -> Option<&SnapshotFile> {
        self.file.as_ref()
    }

    /// Restore on start; a failure is logged and the engine stays empty
    pub async fn restore_or_start_empty(&self) {
        if let Err(e) = self.restore().await {
            error!(error = %e, "[STORAGE] Restore failed, starting with an empty store");
        }
    }

    /// Start the snapshot ticker and the change drain for a periodic policy
    ///
    /// Both tasks stop when the coordinator's token is cancelled. Other
    /// policies start nothing.
    pub fn spawn_background(self: &Arc<Self>, coordinator: &ShutdownCoordinator) {
        let SnapshotPolicy::Periodic(period) = self.policy else {
            return;
        };

        let drain = self
            .change_drain
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(mut receiver) = drain {
            let cancel = coordinator.child_token();
            coordinator.spawn("snapshot-change-drain", async move {
                loop {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => break,
                        change = receiver.recv() => {
                            if change.is_none() {
                                break;
                            }
                        }
                    }
                }
                debug!("[STORAGE] Change drain stopped");
            });
        }

        let repository = Arc::clone(self);
        let cancel = coordinator.child_token();
        coordinator.spawn("snapshot-ticker", async move {
            let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = repository.dump().await {
                            error!(error = %e, "[STORAGE] Periodic snapshot failed");
                        }
                    }
                }
            }
            debug!("[STORAGE] Snapshot ticker stopped");
        });
        info!(period = ?period, "[STORAGE] Periodic snapshots enabled");
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, Snapshot>> {
        self.state
            .read()
            .map_err(|_| Error::internal("Metric store lock is poisoned"))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, Snapshot>> {
        self.state
            .write()
            .map_err(|_| Error::internal("Metric store lock is poisoned"))
    }

    /// Persist or announce a successful write
    ///
    /// The write is already applied, so a failed immediate snapshot is only
    /// logged.
    async fn written(&self) {
        match self.policy {
            SnapshotPolicy::Immediate => {
                if let Err(e) = self.dump().await {
                    error!(error = %e, "[STORAGE] Snapshot after write failed");
                }
            }
            SnapshotPolicy::Periodic(_) => {
                let _ = self.changes.try_send(());
            }
            SnapshotPolicy::Disabled => {}
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn add_counter(
    counters: &BTreeMap<String, i64>,
    name: &str,
    base: Option<i64>,
    delta: i64,
) -> Result<i64> {
    base.or_else(|| counters.get(name).copied())
        .unwrap_or(0)
        .checked_add(delta)
        .ok_or_else(|| Error::invalid_argument(format!("Counter {name} would overflow")))
}

#[async_trait]
impl MetricRepository for InMemoryRepository {
    async fn insert_counter(&self, name: &str, delta: i64) -> Result<()> {
        {
            let mut state = self.write_state()?;
            let total = add_counter(&state.counter, name, None, delta)?;
            state.counter.insert(name.to_string(), total);
        }
        self.written().await;
        Ok(())
    }

    async fn insert_gauge(&self, name: &str, value: f64) -> Result<()> {
        self.write_state()?.gauge.insert(name.to_string(), value);
        self.written().await;
        Ok(())
    }

    async fn counter_value(&self, name: &str) -> Result<Option<i64>> {
        Ok(self.read_state()?.counter.get(name).copied())
    }

    async fn gauge_value(&self, name: &str) -> Result<Option<f64>> {
        Ok(self.read_state()?.gauge.get(name).copied())
    }

    async fn list_all(&self) -> Result<MetricListing> {
        let state = self.read_state()?;
        Ok(MetricListing::new(
            state.counter.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            state.gauge.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        ))
    }

    async fn batch_insert(&self, batch: &[Metrics]) -> Result<()> {
        {
            let mut state = self.write_state()?;

            // Stage everything first so a bad entry leaves the maps untouched
            let mut counters: HashMap<&str, i64> = HashMap::new();
            let mut gauges: HashMap<&str, f64> = HashMap::new();
            for metric in batch {
                match metric.numeric()? {
                    MetricValue::Counter(delta) => {
                        let base = counters.get(metric.id.as_str()).copied();
                        let total = add_counter(&state.counter, &metric.id, base, delta)?;
                        counters.insert(&metric.id, total);
                    }
                    MetricValue::Gauge(value) => {
                        gauges.insert(&metric.id, value);
                    }
                }
            }

            for (name, total) in counters {
                state.counter.insert(name.to_string(), total);
            }
            for (name, value) in gauges {
                state.gauge.insert(name.to_string(), value);
            }
        }
        self.written().await;
        Ok(())
    }

    async fn exists(&self, kind: MetricKind, name: &str) -> Result<bool> {
        let state = self.read_state()?;
        Ok(match kind {
            MetricKind::Counter => state.counter.contains_key(name),
            MetricKind::Gauge => state.gauge.contains_key(name),
        })
    }

    async fn dump(&self) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        let _guard = self.dump_lock.lock().await;
        let snapshot = self.read_state()?.clone();
        file.write(&snapshot).await?;
        debug!(
            path = %file.path().display(),
            counters = snapshot.counter.len(),
            gauges = snapshot.gauge.len(),
            "[STORAGE] Snapshot written"
        );
        Ok(())
    }

    async fn restore(&self) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        let snapshot = file.read().await?;
        info!(
            path = %file.path().display(),
            counters = snapshot.counter.len(),
            gauges = snapshot.gauge.len(),
            "[STORAGE] Snapshot restored"
        );
        *self.write_state()? = snapshot;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let flushed = self.dump().await;
        if let Err(e) = &flushed {
            warn!(error = %e, "[STORAGE] Final snapshot failed");
        }
        *self.write_state()? = Snapshot::default();
        flushed
    }

    fn backend_name(&self) -> &str {
        "in_memory"
    }
}
