//! Metric storage engines
//!
//! | Engine | Selected when |
//! |--------|---------------|
//! | [`PostgresRepository`] | `database_dsn` is set |
//! | [`InMemoryRepository`] | otherwise, with an optional snapshot file |

pub mod memory;
pub mod postgres;
pub mod snapshot;

use std::sync::Arc;

use mcol_domain::error::Result;
use mcol_domain::repositories::SharedRepository;
use mcol_infrastructure::ShutdownCoordinator;
use mcol_infrastructure::config::ServerConfig;
use tracing::info;

pub use memory::{InMemoryRepository, SnapshotPolicy};
pub use postgres::PostgresRepository;
pub use snapshot::{Snapshot, SnapshotFile};

/// Build the repository the server configuration asks for
///
/// The in-memory engine restores its snapshot when `restore` is set and
/// starts its periodic snapshot tasks on `coordinator`.
pub async fn open_repository(
    config: &ServerConfig,
    coordinator: &ShutdownCoordinator,
) -> Result<SharedRepository> {
    if let Some(dsn) = config.database() {
        let repository = PostgresRepository::connect(dsn).await?;
        return Ok(Arc::new(repository));
    }

    let file = config.snapshot_file().map(SnapshotFile::new);
    let repository = Arc::new(InMemoryRepository::with_snapshot(file, config.store_interval));
    if config.restore {
        repository.restore_or_start_empty().await;
    }
    repository.spawn_background(coordinator);
    info!(policy = ?repository.policy(), "[STORAGE] In-memory store ready");
    Ok(repository)
}
