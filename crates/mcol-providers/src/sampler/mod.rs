//! Runtime and OS metric samplers
//!
//! Each source reads a fixed table of `(name, accessor)` entries built at
//! construction. Readings come back in table order.

pub mod runtime;
pub mod system;

pub use runtime::RuntimeSource;
pub use system::SystemSource;

use std::sync::{Arc, Mutex};

use mcol_domain::error::{Error, Result};
use sysinfo::System;

/// Refresh and read a shared `System` on the blocking pool
pub(crate) async fn with_system<T, F>(system: &Arc<Mutex<System>>, read: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut System) -> T + Send + 'static,
{
    let system = Arc::clone(system);
    tokio::task::spawn_blocking(move || {
        let mut guard = system
            .lock()
            .map_err(|_| Error::internal("Sampler lock is poisoned"))?;
        Ok(read(&mut guard))
    })
    .await
    .map_err(|e| Error::internal(format!("Sampler task failed: {e}")))?
}
