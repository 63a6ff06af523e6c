//! Tests for the RPC service

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use mcol_api::{Metrics as _, REAL_IP_METADATA, v1};
use mcol_application::IngestionService;
use mcol_domain::ports::{MetricHasher, MetricTransport};
use mcol_domain::repositories::SharedRepository;
use mcol_domain::{MetricBatch, MetricKind, MetricValue, Metrics};
use mcol_infrastructure::crypto::HmacMetricHasher;
use mcol_providers::storage::InMemoryRepository;
use mcol_providers::transport::grpc::GrpcTransport;
use mcol_server::grpc::MetricsService;
use tokio_util::sync::CancellationToken;
use tonic::{Code, Request};

fn ingestion(key: Option<&str>) -> Arc<IngestionService> {
    let repository: SharedRepository = Arc::new(InMemoryRepository::new());
    let hasher = key.map(|k| Arc::new(HmacMetricHasher::new(k)) as Arc<dyn MetricHasher>);
    Arc::new(IngestionService::new(repository, hasher))
}

fn message(id: &str, kind: &str, delta: i64, value: f64) -> v1::Metric {
    v1::Metric {
        id: id.to_string(),
        m_type: kind.to_string(),
        delta,
        value,
        hash: String::new(),
    }
}

fn from(ip: &str, metric: v1::Metric) -> Request<v1::Metric> {
    let mut request = Request::new(metric);
    request
        .metadata_mut()
        .insert(REAL_IP_METADATA, ip.parse().expect("metadata value"));
    request
}

#[tokio::test]
async fn test_add_gauge_and_counter() {
    let ingestion = ingestion(None);
    let service = MetricsService::new(Arc::clone(&ingestion), None);

    // The method decides the kind, whatever the message says
    service
        .add_metric_gauge(Request::new(message("Alloc", "counter", 0, 2.5)))
        .await
        .expect("gauge");
    for _ in 0..2 {
        service
            .add_metric_counter(Request::new(message("PollCount", "", 3, 0.0)))
            .await
            .expect("counter");
    }

    let reply = service
        .get_metric_value(Request::new(message("Alloc", "gauge", 0, 0.0)))
        .await
        .expect("value")
        .into_inner();
    assert_eq!(reply.value, 2.5);

    let reply = service
        .get_metric_value(Request::new(message("PollCount", "counter", 0, 0.0)))
        .await
        .expect("value")
        .into_inner();
    assert_eq!(reply.delta, 6);
}

#[tokio::test]
async fn test_missing_metric_is_not_found() {
    let service = MetricsService::new(ingestion(None), None);

    let status = service
        .get_metric_value(Request::new(message("Unknown", "counter", 0, 0.0)))
        .await
        .expect_err("missing");
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(status.message(), "Unknown does not exist in Counter db");

    let status = service
        .get_metric(Request::new(message("Unknown", "gauge", 0, 0.0)))
        .await
        .expect_err("missing");
    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn test_unknown_type_is_invalid_argument() {
    let service = MetricsService::new(ingestion(None), None);

    let status = service
        .get_metric_value(Request::new(message("Alloc", "histogram", 0, 0.0)))
        .await
        .expect_err("bad type");
    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_update_metric_only_touches_existing_names() {
    let ingestion = ingestion(None);
    let service = MetricsService::new(Arc::clone(&ingestion), None);

    let status = service
        .update_metric(Request::new(message("Alloc", "gauge", 0, 1.0)))
        .await
        .expect_err("unknown name");
    assert_eq!(status.code(), Code::NotFound);
    assert!(ingestion.value(MetricKind::Gauge, "Alloc").await.is_err());

    ingestion.update(&Metrics::gauge("Alloc", 1.0)).await.expect("seed");
    service
        .update_metric(Request::new(message("Alloc", "gauge", 0, 4.0)))
        .await
        .expect("existing name");
    assert_eq!(
        ingestion.value(MetricKind::Gauge, "Alloc").await.expect("value"),
        MetricValue::Gauge(4.0)
    );
}

#[tokio::test]
async fn test_get_metric_is_signed_when_keyed() {
    let ingestion = ingestion(Some("secret"));
    let hasher = HmacMetricHasher::new("secret");
    let seed = hasher.signed(&Metrics::counter("PollCount", 9)).expect("sign");
    ingestion.update(&seed).await.expect("seed");
    let service = MetricsService::new(ingestion, None);

    let reply = service
        .get_metric(Request::new(message("PollCount", "counter", 0, 0.0)))
        .await
        .expect("metric")
        .into_inner();
    assert_eq!(reply.delta, 9);
    let found = Metrics::try_from(reply).expect("wire");
    assert!(hasher.verify(&found).is_ok());
}

#[tokio::test]
async fn test_writes_check_trusted_subnet() {
    let ingestion = ingestion(None);
    let service = MetricsService::new(
        Arc::clone(&ingestion),
        Some("192.168.0.0/16".parse().expect("subnet")),
    );

    let status = service
        .add_metric_gauge(Request::new(message("Alloc", "gauge", 0, 1.0)))
        .await
        .expect_err("no address");
    assert_eq!(status.code(), Code::PermissionDenied);

    let status = service
        .add_metric_gauge(from("10.0.0.1", message("Alloc", "gauge", 0, 1.0)))
        .await
        .expect_err("outside");
    assert_eq!(status.code(), Code::PermissionDenied);

    service
        .add_metric_gauge(from("192.168.3.4", message("Alloc", "gauge", 0, 1.0)))
        .await
        .expect("inside");

    // Reads are not gated
    service
        .get_metric_value(Request::new(message("Alloc", "gauge", 0, 0.0)))
        .await
        .expect("read");
}

#[tokio::test]
async fn test_batch_with_bad_entry_changes_nothing() {
    let ingestion = ingestion(None);
    let service = MetricsService::new(Arc::clone(&ingestion), None);

    let request = v1::UpdateMetricsRequest {
        metrics: vec![
            message("PollCount", "counter", 1, 0.0),
            message("Alloc", "histogram", 0, 1.0),
        ],
    };
    let status = service
        .update_metrics(Request::new(request))
        .await
        .expect_err("bad entry");
    assert_eq!(status.code(), Code::InvalidArgument);
    assert!(ingestion.listing().await.expect("listing").is_empty());
}

#[tokio::test]
async fn test_metric_names() {
    let ingestion = ingestion(None);
    ingestion.update(&Metrics::counter("PollCount", 2)).await.expect("counter");
    ingestion.update(&Metrics::gauge("Alloc", 1.5)).await.expect("gauge");
    let service = MetricsService::new(ingestion, None);

    let names = service
        .get_metric_names(Request::new(v1::Empty {}))
        .await
        .expect("names")
        .into_inner()
        .names;
    assert_eq!(names, vec!["[Alloc]: [1.500]", "[PollCount]: [2]"]);
}

fn free_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("addr")
}

#[tokio::test]
async fn test_transport_round_trip_over_the_network() {
    let ingestion = ingestion(None);
    let service = MetricsService::new(
        Arc::clone(&ingestion),
        Some("127.0.0.0/8".parse().expect("subnet")),
    );
    let address = free_address();
    let cancel = CancellationToken::new();
    let server = tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(service.into_server())
            .serve_with_shutdown(address, cancel.clone().cancelled_owned()),
    );

    let transport = GrpcTransport::new(
        &address.to_string(),
        Duration::from_secs(2),
        Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
    )
    .expect("transport");
    let batch = MetricBatch::new(vec![Metrics::counter("PollCount", 4), Metrics::gauge("Alloc", 0.5)]);

    let mut sent = transport.send(&batch).await;
    for _ in 0..50 {
        if sent.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        sent = transport.send(&batch).await;
    }
    sent.expect("batch delivered");

    assert_eq!(
        ingestion.value(MetricKind::Counter, "PollCount").await.expect("counter"),
        MetricValue::Counter(4)
    );

    cancel.cancel();
    server.await.expect("join").expect("server stopped cleanly");
}
