//! # Metric Collector - Provider Implementations
//!
//! Implementations of the ports defined in `mcol-domain`.
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Storage | `MetricRepository` | InMemory, Postgres |
//! | Sampler | `MetricSource` | Runtime, System |
//! | Transport | `MetricTransport` | Http, Grpc |
//!
//! ## Usage
//!
//! ```ignore
//! use mcol_providers::storage::open_repository;
//! use mcol_providers::sampler::{RuntimeSource, SystemSource};
//! use mcol_providers::transport::build_transport;
//! ```

pub use mcol_domain::error::{Error, Result};
pub use mcol_domain::ports::{MetricSource, MetricTransport};
pub use mcol_domain::repositories::MetricRepository;

/// Provider-specific constants
pub mod constants;

/// Metric storage engines
pub mod storage;

/// Runtime and OS metric samplers
pub mod sampler;

/// Agent to collector transports
pub mod transport;
