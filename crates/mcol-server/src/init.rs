//! Server initialization
//!
//! Loads the configuration, opens the storage engine, then serves HTTP and,
//! when `grpc_address` is set, RPC until a termination signal arrives.
//! Shutdown stops both listeners, waits for background tasks and closes the
//! repository, which writes the final snapshot.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mcol_application::IngestionService;
use mcol_domain::error::{Error, Result};
use mcol_domain::ports::MetricHasher;
use mcol_infrastructure::config::{ConfigLoader, ServerConfig};
use mcol_infrastructure::constants::SHUTDOWN_GRACE_SECS;
use mcol_infrastructure::crypto::{HmacMetricHasher, PayloadDecryptor};
use mcol_infrastructure::logging::init_logging;
use mcol_infrastructure::net::split_host_port;
use mcol_infrastructure::{ErrorContext, ShutdownCoordinator};
use mcol_providers::storage::open_repository;
use tracing::{error, info};

use crate::cli::Cli;
use crate::grpc::MetricsService;
use crate::http;
use crate::state::ServerState;

/// Run the server until shutdown
pub async fn run(cli: Cli) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    let config: ServerConfig = loader.load_with(&cli)?;
    init_logging(&config.logging)?;
    info!(
        address = %config.address,
        grpc = ?config.rpc_address(),
        engine = if config.database().is_some() { "postgres" } else { "in_memory" },
        "Starting metric collector server"
    );

    let coordinator = ShutdownCoordinator::new();
    coordinator.listen_for_signals();

    let repository = open_repository(&config, &coordinator).await?;
    let hasher = config
        .signing_key()
        .map(|key| Arc::new(HmacMetricHasher::new(key)) as Arc<dyn MetricHasher>);
    let decryptor = config
        .crypto_key_path()
        .map(PayloadDecryptor::from_pem_file)
        .transpose()?;
    let trusted = config.trusted()?;
    let ingestion = Arc::new(IngestionService::new(Arc::clone(&repository), hasher));

    if let Some(address) = config.rpc_address() {
        let address = resolve(address).await?;
        let service = MetricsService::new(Arc::clone(&ingestion), trusted);
        let cancel = coordinator.child_token();
        coordinator.spawn("rpc-server", async move {
            info!(%address, "[RPC] Listening");
            let served = tonic::transport::Server::builder()
                .add_service(service.into_server())
                .serve_with_shutdown(address, cancel.cancelled_owned())
                .await;
            if let Err(e) = served {
                error!(error = %e, "[RPC] Server failed");
            }
        });
    }

    let state = ServerState::new(ingestion)?
        .with_trusted_subnet(trusted)
        .with_decryptor(decryptor);
    let served = serve_http(state, &config, &coordinator).await;

    coordinator.shutdown(Duration::from_secs(SHUTDOWN_GRACE_SECS)).await;
    if let Err(e) = repository.close().await {
        error!(error = %e, "Failed to close {} storage", repository.backend_name());
    }
    info!("Metric collector server stopped");
    served.map_err(Into::into)
}

/// Serve HTTP until the coordinator is cancelled
async fn serve_http(
    state: ServerState,
    config: &ServerConfig,
    coordinator: &ShutdownCoordinator,
) -> Result<()> {
    let address = resolve(&config.address).await?;
    let figment = rocket::Config::figment()
        .merge(("address", address.ip()))
        .merge(("port", address.port()))
        .merge(("log_level", "critical"))
        .merge(("shutdown.ctrlc", false))
        .merge(("shutdown.signals", Vec::<String>::new()))
        .merge(("shutdown.grace", 2))
        .merge(("shutdown.mercy", 3));

    let rocket = http::rocket(state)
        .configure(figment)
        .ignite()
        .await
        .map_err(|e| Error::configuration(format!("HTTP server failed to start: {e}")))?;

    let shutdown = rocket.shutdown();
    let token = coordinator.token();
    tokio::spawn(async move {
        token.cancelled().await;
        shutdown.notify();
    });

    info!(%address, "[HTTP] Listening");
    let launched = rocket.launch().await;
    // Rocket may stop on its own; take the rest of the process down with it
    coordinator.token().cancel();
    launched
        .map(|_| ())
        .map_err(|e| Error::network(format!("HTTP server failed: {e}")))
}

/// Resolve `host:port` to the first socket address
pub async fn resolve(address: &str) -> Result<SocketAddr> {
    let (host, port) = split_host_port(address)?;
    tokio::net::lookup_host((host.as_str(), port))
        .await
        .network_context(format!("Failed to resolve {address}"))?
        .next()
        .ok_or_else(|| Error::configuration(format!("{address} resolves to no address")))
}
