//! PostgreSQL metric storage
//!
//! Both namespaces share one table keyed by `(name, type)`. Counters are
//! upserted as `value = metrics.value + delta`, gauges as `value = excluded`.
//! The synchronous `postgres` client runs on the blocking pool; every
//! connection carries a 5 s statement timeout.

use std::time::Duration;

use async_trait::async_trait;
use mcol_domain::constants::{COUNTER_TYPE, GAUGE_TYPE};
use mcol_domain::error::{Error, Result};
use mcol_domain::repositories::MetricRepository;
use mcol_domain::{MetricListing, MetricValue, Metrics};
use mcol_infrastructure::ErrorContext;
use mcol_infrastructure::constants::DATABASE_QUERY_TIMEOUT_SECS;
use r2d2::{Pool, PooledConnection};
use r2d2_postgres::PostgresConnectionManager;
use r2d2_postgres::postgres::{Client, Config, NoTls};
use tracing::{debug, info};

use crate::constants::{DATABASE_POOL_SIZE, STATEMENT_TIMEOUT_OPTION};

type Manager = PostgresConnectionManager<NoTls>;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS metrics (
    id serial PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    value double precision NOT NULL,
    type VARCHAR(10) NOT NULL,
    UNIQUE (name, type)
)";

const UPSERT_COUNTER: &str = "INSERT INTO metrics (name, value, type) VALUES ($1, $2, 'counter')
    ON CONFLICT (name, type) DO UPDATE SET value = metrics.value + EXCLUDED.value";

const UPSERT_GAUGE: &str = "INSERT INTO metrics (name, value, type) VALUES ($1, $2, 'gauge')
    ON CONFLICT (name, type) DO UPDATE SET value = EXCLUDED.value";

const SELECT_VALUE: &str = "SELECT value FROM metrics WHERE name = $1 AND type = $2";

const SELECT_ALL: &str = "SELECT name, value, type FROM metrics";

/// PostgreSQL metric repository
pub struct PostgresRepository {
    pool: Pool<Manager>,
}

impl PostgresRepository {
    /// Connect to `dsn` and create the table if needed
    pub async fn connect(dsn: &str) -> Result<Self> {
        let mut config: Config = dsn.parse().db_context("Invalid database DSN")?;
        config
            .options(STATEMENT_TIMEOUT_OPTION)
            .connect_timeout(query_timeout());
        let manager = PostgresConnectionManager::new(config, NoTls);

        let pool = tokio::task::spawn_blocking(move || {
            Pool::builder()
                .max_size(DATABASE_POOL_SIZE)
                .connection_timeout(query_timeout())
                .build(manager)
        })
        .await
        .map_err(|e| Error::internal(format!("Database connect task failed: {e}")))?
        .db_context("Unable to connect to database")?;

        let repository = Self { pool };
        repository
            .with_client("Table creation failed", |client| client.batch_execute(CREATE_TABLE))
            .await?;
        info!("[STORAGE] Connected to PostgreSQL");
        Ok(repository)
    }

    /// Run `op` on a pooled connection on the blocking pool
    async fn with_client<T, F>(&self, context: &'static str, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Client) -> std::result::Result<T, r2d2_postgres::postgres::Error>
            + Send
            + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn: PooledConnection<Manager> =
                pool.get().db_context("Failed to get a database connection")?;
            op(&mut conn).db_context(context)
        })
        .await
        .map_err(|e| Error::internal(format!("Database task failed: {e}")))?
    }

    async fn value(&self, name: &str, kind: &'static str) -> Result<Option<f64>> {
        let name = name.to_string();
        let row = self
            .with_client("Select value failed", move |client| {
                client.query_opt(SELECT_VALUE, &[&name, &kind])
            })
            .await?;
        row.map(|row| row.try_get::<_, f64>(0))
            .transpose()
            .db_context("Unexpected value column")
    }
}

fn query_timeout() -> Duration {
    Duration::from_secs(DATABASE_QUERY_TIMEOUT_SECS)
}

#[async_trait]
impl MetricRepository for PostgresRepository {
    async fn insert_counter(&self, name: &str, delta: i64) -> Result<()> {
        let name = name.to_string();
        let delta = delta as f64;
        self.with_client("Insert counter failed", move |client| {
            client.execute(UPSERT_COUNTER, &[&name, &delta]).map(|_| ())
        })
        .await
    }

    async fn insert_gauge(&self, name: &str, value: f64) -> Result<()> {
        let name = name.to_string();
        self.with_client("Insert gauge failed", move |client| {
            client.execute(UPSERT_GAUGE, &[&name, &value]).map(|_| ())
        })
        .await
    }

    async fn counter_value(&self, name: &str) -> Result<Option<i64>> {
        Ok(self.value(name, COUNTER_TYPE).await?.map(|v| v as i64))
    }

    async fn gauge_value(&self, name: &str) -> Result<Option<f64>> {
        self.value(name, GAUGE_TYPE).await
    }

    async fn list_all(&self) -> Result<MetricListing> {
        let rows = self
            .with_client("Select all failed", |client| client.query(SELECT_ALL, &[]))
            .await?;

        let mut counters = Vec::new();
        let mut gauges = Vec::new();
        for row in rows {
            let name: String = row.try_get(0).db_context("Unexpected name column")?;
            let value: f64 = row.try_get(1).db_context("Unexpected value column")?;
            let kind: String = row.try_get(2).db_context("Unexpected type column")?;
            if kind == COUNTER_TYPE {
                counters.push((name, value as i64));
            } else {
                gauges.push((name, value));
            }
        }
        Ok(MetricListing::new(counters, gauges))
    }

    /// One transaction with two prepared statements; the first failing
    /// statement rolls everything back
    async fn batch_insert(&self, batch: &[Metrics]) -> Result<()> {
        let entries = batch
            .iter()
            .map(|m| m.numeric().map(|v| (m.id.clone(), v)))
            .collect::<Result<Vec<_>>>()?;
        let count = entries.len();

        self.with_client("Batch insert failed", move |client| {
            let mut tx = client.transaction()?;
            let counter = tx.prepare(UPSERT_COUNTER)?;
            let gauge = tx.prepare(UPSERT_GAUGE)?;
            for (name, value) in &entries {
                match value {
                    MetricValue::Counter(delta) => {
                        tx.execute(&counter, &[name, &(*delta as f64)])?;
                    }
                    MetricValue::Gauge(value) => {
                        tx.execute(&gauge, &[name, value])?;
                    }
                }
            }
            tx.commit()
        })
        .await?;

        debug!(count, "[STORAGE] Batch committed");
        Ok(())
    }

    async fn dump(&self) -> Result<()> {
        debug!("[STORAGE] PostgreSQL is durable, nothing to dump");
        Ok(())
    }

    async fn restore(&self) -> Result<()> {
        debug!("[STORAGE] PostgreSQL is durable, nothing to restore");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let ping = self.with_client("Ping failed", |client| client.simple_query("SELECT 1").map(|_| ()));
        tokio::time::timeout(query_timeout(), ping)
            .await
            .map_err(|_| Error::database("Ping timed out"))?
    }

    async fn close(&self) -> Result<()> {
        info!(
            idle = self.pool.state().idle_connections,
            "[STORAGE] Closing PostgreSQL pool"
        );
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "postgres"
    }
}
