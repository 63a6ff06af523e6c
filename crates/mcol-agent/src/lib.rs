//! Metric collector agent
//!
//! Samples process runtime and host counters every poll interval
//! and reports them to the collector every report interval, over HTTP or
//! RPC.

pub mod cli;
pub mod init;

pub use cli::Cli;
pub use init::run;
