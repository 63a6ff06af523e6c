//! Infrastructure layer for the metric collector
//!
//! Cross-cutting concerns shared by the agent and the server:
//!
//! - **config** - typed settings and the layered figment loader
//! - **logging** - tracing subscriber setup
//! - **crypto** - HMAC metric signing, RSA-OAEP payload encryption
//! - **codec** - gzip and `Content-Encoding` framing of request bodies
//! - **net** - trusted subnet checks, outbound address discovery
//! - **shutdown** - signal driven cancellation and task tracking

pub mod codec;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error_ext;
pub mod logging;
pub mod net;
pub mod shutdown;

pub use error_ext::ErrorContext;
pub use shutdown::ShutdownCoordinator;
