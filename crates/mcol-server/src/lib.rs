//! Metric collector server
//!
//! Two ingestion surfaces over one [`IngestionService`]:
//!
//! | Surface | Module | Listens on |
//! |---------|--------|------------|
//! | HTTP (Rocket) | [`http`] | `address` |
//! | RPC (tonic) | [`grpc`] | `grpc_address`, when set |
//!
//! [`IngestionService`]: mcol_application::IngestionService

pub mod cli;
pub mod grpc;
pub mod http;
pub mod init;
pub mod state;

pub use cli::Cli;
pub use init::run;
pub use state::ServerState;
