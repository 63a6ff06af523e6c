//! RPC surface: the `metrics.v1.Metrics` service
//!
//! Writes check the caller's `x-real-ip` metadata against the trusted subnet.
//! Domain errors map onto status codes: not found, invalid argument,
//! permission denied, everything else internal.

use std::sync::Arc;

use mcol_api::convert::batch_from_request;
use mcol_api::{MetricsServer, REAL_IP_METADATA, v1};
use mcol_application::IngestionService;
use mcol_domain::error::Error;
use mcol_domain::{MetricKind, Metrics};
use mcol_infrastructure::net::TrustedSubnet;
use tonic::{Request, Response, Status};
use tracing::{error, warn};

/// Status code of a domain error
pub fn status_of(error: Error) -> Status {
    match error {
        Error::NotFound { resource } => Status::not_found(resource),
        Error::Forbidden { message } => Status::permission_denied(message),
        Error::Unsupported { message } => Status::invalid_argument(message),
        e if e.is_client_error() => Status::invalid_argument(e.to_string()),
        e => {
            error!(error = %e, "[RPC] Request failed");
            Status::internal(e.to_string())
        }
    }
}

/// RPC ingestion service
pub struct MetricsService {
    ingestion: Arc<IngestionService>,
    trusted: Option<TrustedSubnet>,
}

impl MetricsService {
    pub fn new(ingestion: Arc<IngestionService>, trusted: Option<TrustedSubnet>) -> Self {
        Self { ingestion, trusted }
    }

    /// Wrap into the generated tonic server
    pub fn into_server(self) -> MetricsServer<Self> {
        MetricsServer::new(self)
    }

    fn authorize<T>(&self, request: &Request<T>) -> Result<(), Status> {
        let Some(subnet) = &self.trusted else {
            return Ok(());
        };
        let caller = request
            .metadata()
            .get(REAL_IP_METADATA)
            .and_then(|value| value.to_str().ok());
        subnet.check(caller).map_err(|e| {
            warn!(caller = ?caller, error = %e, "[RPC] Write from untrusted address refused");
            status_of(e)
        })
    }

    /// Apply one metric message after forcing its kind
    async fn add(
        &self,
        request: Request<v1::Metric>,
        kind: MetricKind,
    ) -> Result<Response<v1::StdResponse>, Status> {
        self.authorize(&request)?;
        let mut message = request.into_inner();
        message.m_type = kind.as_str().to_string();
        let metric = Metrics::try_from(message).map_err(status_of)?;
        self.ingestion.update(&metric).await.map_err(status_of)?;
        Ok(Response::new(v1::StdResponse::ok()))
    }
}

#[tonic::async_trait]
impl mcol_api::Metrics for MetricsService {
    async fn add_metric_gauge(
        &self,
        request: Request<v1::Metric>,
    ) -> Result<Response<v1::StdResponse>, Status> {
        self.add(request, MetricKind::Gauge).await
    }

    async fn add_metric_counter(
        &self,
        request: Request<v1::Metric>,
    ) -> Result<Response<v1::StdResponse>, Status> {
        self.add(request, MetricKind::Counter).await
    }

    async fn get_metric_value(
        &self,
        request: Request<v1::Metric>,
    ) -> Result<Response<v1::GetMetricValueResponse>, Status> {
        let message = request.into_inner();
        let kind: MetricKind = message.m_type.parse().map_err(status_of)?;
        let value = self.ingestion.value(kind, &message.id).await.map_err(status_of)?;
        Ok(Response::new(value.into()))
    }

    /// Only names already stored are written
    async fn update_metric(
        &self,
        request: Request<v1::Metric>,
    ) -> Result<Response<v1::StdResponse>, Status> {
        self.authorize(&request)?;
        let metric = Metrics::try_from(request.into_inner()).map_err(status_of)?;
        if self.ingestion.update_existing(&metric).await.map_err(status_of)? {
            Ok(Response::new(v1::StdResponse::ok()))
        } else {
            Err(Status::not_found(format!(
                "{} does not exist in {} db",
                metric.id,
                metric.kind.label()
            )))
        }
    }

    async fn get_metric(
        &self,
        request: Request<v1::Metric>,
    ) -> Result<Response<v1::Metric>, Status> {
        let message = request.into_inner();
        let kind: MetricKind = message.m_type.parse().map_err(status_of)?;
        let found = self
            .ingestion
            .lookup(&Metrics::query(message.id, kind))
            .await
            .map_err(status_of)?;
        Ok(Response::new(v1::Metric::from(&found)))
    }

    async fn update_metrics(
        &self,
        request: Request<v1::UpdateMetricsRequest>,
    ) -> Result<Response<v1::StdResponse>, Status> {
        self.authorize(&request)?;
        let batch = batch_from_request(request.into_inner()).map_err(status_of)?;
        self.ingestion.update_batch(&batch).await.map_err(status_of)?;
        Ok(Response::new(v1::StdResponse::ok()))
    }

    async fn get_metric_names(
        &self,
        _request: Request<v1::Empty>,
    ) -> Result<Response<v1::GetMetricNamesResponse>, Status> {
        let listing = self.ingestion.listing().await.map_err(status_of)?;
        Ok(Response::new(v1::GetMetricNamesResponse {
            names: listing.lines(),
        }))
    }
}
