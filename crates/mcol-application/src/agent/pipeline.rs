//! Agent pipeline
//!
//! Owns the live metric list and drives the three phases:
//!
//! - **init**: every source is sampled concurrently, the results are merged
//!   through [`fan_in`] into one ordered list, then a best-effort send follows.
//! - **update** (poll tick): under the list lock, every metric is refreshed in
//!   its own task and the tasks are joined before the lock is released.
//! - **send** (report tick): under the same lock, the batch is built and
//!   handed to the transport with bounded retry.
//!
//! The list lock is the only shared-state invariant: an update never runs
//! while a batch is being built or sent, and vice versa.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mcol_domain::error::{Error, Result};
use mcol_domain::ports::{MetricHasher, MetricSource, MetricTransport};
use mcol_domain::{Metric, MetricBatch, MetricValue};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::backoff::{RetryPolicy, retry_with_backoff};
use super::fan_in::{SampleResult, fan_in};

/// Timing knobs of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    /// Period of the update phase
    pub poll_interval: Duration,
    /// Period of the send phase
    pub report_interval: Duration,
    /// Retry policy of every send
    pub retry: RetryPolicy,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            report_interval: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// Metric agent
pub struct MetricAgent {
    sources: Vec<Arc<dyn MetricSource>>,
    transport: Arc<dyn MetricTransport>,
    hasher: Option<Arc<dyn MetricHasher>>,
    settings: AgentSettings,
    metrics: Mutex<Vec<Metric>>,
}

impl MetricAgent {
    /// Create an agent with an empty metric list
    pub fn new(
        sources: Vec<Arc<dyn MetricSource>>,
        transport: Arc<dyn MetricTransport>,
        hasher: Option<Arc<dyn MetricHasher>>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            sources,
            transport,
            hasher,
            settings,
            metrics: Mutex::new(Vec::new()),
        }
    }

    /// Agent settings
    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Copy of the current metric list
    pub async fn snapshot(&self) -> Vec<Metric> {
        self.metrics.lock().await.clone()
    }

    /// Init phase: sample every source concurrently and install the merged list
    ///
    /// Returns the number of collected metrics. The first sampling error is
    /// returned as soon as it is seen.
    pub async fn collect(&self) -> Result<usize> {
        let mut inputs = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let (tx, rx) = mpsc::channel::<SampleResult>(1);
            let source = Arc::clone(source);
            tokio::spawn(async move {
                let sample = source.read().await.map(|readings| {
                    readings
                        .into_iter()
                        .map(|(name, value)| Metric::new(name, value))
                        .collect::<Vec<_>>()
                });
                if tx.send(sample).await.is_err() {
                    debug!(source = source.name(), "Sample discarded");
                }
            });
            inputs.push(rx);
        }

        let (out_tx, mut out_rx) = mpsc::channel(inputs.len() + 1);
        tokio::spawn(fan_in(inputs, out_tx));

        match out_rx.recv().await {
            Some(Ok(merged)) => {
                let count = merged.len();
                *self.metrics.lock().await = merged;
                Ok(count)
            }
            Some(Err(e)) => Err(e),
            None => Err(Error::internal("fan-in closed without a sample")),
        }
    }

    /// Update phase: refresh every metric from a fresh read of all sources
    pub async fn update(&self) -> Result<()> {
        let mut metrics = self.metrics.lock().await;
        let readings = Arc::new(self.read_sources().await);

        let mut tasks = JoinSet::new();
        for (index, metric) in metrics.iter().cloned().enumerate() {
            let readings = Arc::clone(&readings);
            tasks.spawn(async move {
                let mut metric = metric;
                let reading = readings
                    .get(metric.name())
                    .copied()
                    .unwrap_or_else(|| metric.value());
                metric.observe(reading);
                (index, metric)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, metric) =
                joined.map_err(|e| Error::internal(format!("metric update task failed: {e}")))?;
            metrics[index] = metric;
        }

        debug!(count = metrics.len(), "Metrics updated");
        Ok(())
    }

    /// Send phase: build the batch and hand it to the transport with retry
    pub async fn report(&self, cancel: &CancellationToken) -> Result<()> {
        let metrics = self.metrics.lock().await;
        let batch = self.build_batch(&metrics)?;
        if batch.is_empty() {
            return Ok(());
        }

        let transport = &self.transport;
        let batch = &batch;
        let sent = retry_with_backoff(&self.settings.retry, cancel, move |attempt| {
            debug!(attempt, protocol = transport.protocol(), "Sending metrics");
            transport.send(batch)
        })
        .await?;

        if sent.is_some() {
            info!(count = batch.len(), protocol = self.transport.protocol(), "Metrics sent");
        }
        Ok(())
    }

    /// Run the agent until `cancel` fires or a send fails for good
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) -> Result<()> {
        let count = self.collect().await?;
        info!(count, sources = self.sources.len(), "[AGENT] Initial sample collected");

        if let Err(e) = self.report(&cancel).await {
            warn!(error = %e, "[AGENT] Initial send failed");
        }

        let phases = cancel.child_token();
        let updater = tokio::spawn(Arc::clone(&self).update_loop(phases.clone()));
        let reporter = tokio::spawn(Arc::clone(&self).report_loop(phases.clone()));

        let outcome = match reporter.await {
            Ok(result) => result,
            Err(e) => Err(Error::internal(format!("report loop panicked: {e}"))),
        };

        phases.cancel();
        if let Err(e) = updater.await {
            error!(error = %e, "[AGENT] Update loop panicked");
        }

        match &outcome {
            Ok(()) => info!("[AGENT] Stopped"),
            Err(e) => error!(error = %e, "[AGENT] Stopped after unrecoverable send failure"),
        }
        outcome
    }

    async fn update_loop(self: Arc<Self>, cancel: CancellationToken) {
        let period = self.settings.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                _ = ticker.tick() => {
                    if let Err(e) = self.update().await {
                        warn!(error = %e, "Update phase failed");
                    }
                }
            }
        }
    }

    async fn report_loop(self: Arc<Self>, cancel: CancellationToken) -> Result<()> {
        let period = self.settings.report_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(()),
                _ = ticker.tick() => self.report(&cancel).await?,
            }
        }
    }

    /// Read every source; a failing source is logged and its metrics keep their values
    async fn read_sources(&self) -> HashMap<String, MetricValue> {
        let mut readings = HashMap::new();
        for source in &self.sources {
            match source.read().await {
                Ok(values) => readings.extend(values),
                Err(e) => warn!(source = source.name(), error = %e, "Source read failed"),
            }
        }
        readings
    }

    fn build_batch(&self, metrics: &[Metric]) -> Result<MetricBatch> {
        metrics
            .iter()
            .map(|metric| {
                let wire = metric.to_wire();
                match &self.hasher {
                    Some(hasher) => hasher.signed(&wire),
                    None => Ok(wire),
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(MetricBatch::new)
    }
}
