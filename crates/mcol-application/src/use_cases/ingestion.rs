//! Ingestion Service Use Case
//!
//! Validates, authenticates and applies metric writes, and answers reads.
//! Write order: shape check, numeric parse, hash verification (when a key is
//! configured), storage apply. A batch is verified in full before any entry
//! reaches storage.

use std::sync::Arc;

use mcol_domain::error::{Error, Result};
use mcol_domain::ports::MetricHasher;
use mcol_domain::repositories::SharedRepository;
use mcol_domain::{MetricKind, MetricListing, MetricValue, Metrics};
use tracing::{debug, warn};

/// Server side entry point for every transport
pub struct IngestionService {
    repository: SharedRepository,
    hasher: Option<Arc<dyn MetricHasher>>,
}

impl IngestionService {
    /// Create the service over a repository, with an optional hasher
    pub fn new(repository: SharedRepository, hasher: Option<Arc<dyn MetricHasher>>) -> Self {
        Self { repository, hasher }
    }

    /// Backing repository
    pub fn repository(&self) -> &SharedRepository {
        &self.repository
    }

    /// Whether writes must carry a valid hash
    pub fn requires_hash(&self) -> bool {
        self.hasher.is_some()
    }

    /// Apply a path-style update (`/update/{kind}/{name}/{value}`)
    pub async fn update_raw(&self, kind: MetricKind, name: &str, raw: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::invalid_argument("No metric was given!"));
        }
        let value = MetricValue::parse(kind, raw)?;
        self.apply(name, value).await
    }

    /// Apply one wire metric
    pub async fn update(&self, metric: &Metrics) -> Result<MetricValue> {
        metric.validate()?;
        self.verify(metric)?;
        let value = metric.numeric()?;
        self.apply(&metric.id, value).await?;
        self.value(metric.kind, &metric.id).await
    }

    /// Apply one wire metric only when its name is already stored
    ///
    /// Returns whether anything was written.
    pub async fn update_existing(&self, metric: &Metrics) -> Result<bool> {
        metric.validate()?;
        self.verify(metric)?;
        if !self.repository.exists(metric.kind, &metric.id).await? {
            debug!(id = %metric.id, kind = %metric.kind, "Skipping update of unknown metric");
            return Ok(false);
        }
        self.apply(&metric.id, metric.numeric()?).await?;
        Ok(true)
    }

    /// Apply a batch as one unit; returns the number of applied entries
    pub async fn update_batch(&self, batch: &[Metrics]) -> Result<usize> {
        for metric in batch {
            metric.validate()?;
        }
        for metric in batch {
            self.verify(metric)?;
        }
        if batch.is_empty() {
            return Ok(0);
        }
        self.repository.batch_insert(batch).await?;
        debug!(count = batch.len(), "Batch applied");
        Ok(batch.len())
    }

    /// Stored value, or a not-found error naming the namespace
    pub async fn value(&self, kind: MetricKind, name: &str) -> Result<MetricValue> {
        self.repository
            .value_of(kind, name)
            .await?
            .ok_or_else(|| Error::not_found(format!("{name} does not exist in {} db", kind.label())))
    }

    /// Answer a JSON lookup with the stored value, signed when a key is set
    ///
    /// A non-empty hash in the query must match the stored value under the
    /// server key, otherwise the lookup fails with an integrity error.
    pub async fn lookup(&self, query: &Metrics) -> Result<Metrics> {
        let value = self.value(query.kind, &query.id).await?;
        let found = Metrics::from_value(&query.id, value);
        let Some(hasher) = &self.hasher else {
            return Ok(found);
        };
        if let Some(supplied) = query.hash.as_deref().filter(|h| !h.is_empty()) {
            self.verify(&found.clone().with_hash(supplied))?;
        }
        hasher.signed(&found)
    }

    /// Every stored metric
    pub async fn listing(&self) -> Result<MetricListing> {
        self.repository.list_all().await
    }

    /// Storage health
    pub async fn ping(&self) -> Result<()> {
        self.repository.ping().await
    }

    fn verify(&self, metric: &Metrics) -> Result<()> {
        let Some(hasher) = &self.hasher else {
            return Ok(());
        };
        hasher.verify(metric).inspect_err(|e| {
            warn!(id = %metric.id, kind = %metric.kind, error = %e, "Metric rejected by integrity check");
        })
    }

    async fn apply(&self, name: &str, value: MetricValue) -> Result<()> {
        match value {
            MetricValue::Counter(delta) => self.repository.insert_counter(name, delta).await,
            MetricValue::Gauge(value) => self.repository.insert_gauge(name, value).await,
        }
    }
}
