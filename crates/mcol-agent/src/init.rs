//! Agent initialization

use std::sync::Arc;

use mcol_application::MetricAgent;
use mcol_domain::ports::{MetricHasher, MetricSource};
use mcol_infrastructure::ShutdownCoordinator;
use mcol_infrastructure::config::{AgentConfig, ConfigLoader};
use mcol_infrastructure::crypto::HmacMetricHasher;
use mcol_infrastructure::logging::init_logging;
use mcol_infrastructure::net::outbound_ip;
use mcol_providers::sampler::{RuntimeSource, SystemSource};
use mcol_providers::transport::build_transport;
use tracing::{info, warn};

use crate::cli::Cli;

/// Run the agent until a termination signal arrives or a report fails for good
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    let config: AgentConfig = loader.load_with(&cli)?;
    init_logging(&config.logging)?;

    let real_ip = match outbound_ip().await {
        Ok(ip) => Some(ip),
        Err(e) => {
            warn!(error = %e, "Outbound address unknown, reporting without X-Real-IP");
            None
        }
    };
    let transport = build_transport(&config, real_ip)?;
    let sources: Vec<Arc<dyn MetricSource>> = vec![
        Arc::new(RuntimeSource::new()),
        Arc::new(SystemSource::new()),
    ];
    let hasher = config
        .signing_key()
        .map(|key| Arc::new(HmacMetricHasher::new(key)) as Arc<dyn MetricHasher>);

    info!(
        protocol = config.protocol.as_str(),
        address = %config.address,
        grpc_address = %config.grpc_address,
        poll = ?config.poll_interval,
        report = ?config.report_interval,
        signed = hasher.is_some(),
        encrypted = config.crypto_key_path().is_some(),
        "Starting metric agent"
    );

    let coordinator = ShutdownCoordinator::new();
    coordinator.listen_for_signals();

    let agent = Arc::new(MetricAgent::new(
        sources,
        transport,
        hasher,
        config.agent_settings(),
    ));
    agent.run(coordinator.token()).await?;
    Ok(())
}
