//! Tests for the HTTP endpoints

use std::sync::Arc;

use mcol_application::IngestionService;
use mcol_domain::ports::MetricHasher;
use mcol_domain::repositories::SharedRepository;
use mcol_domain::{MetricKind, MetricValue, Metrics};
use mcol_infrastructure::codec::{gzip, seal};
use mcol_infrastructure::crypto::{HmacMetricHasher, PayloadDecryptor, PayloadEncryptor};
use mcol_providers::storage::InMemoryRepository;
use mcol_server::ServerState;
use mcol_server::http::rocket;
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;
use rsa::RsaPrivateKey;
use rsa::rand_core::OsRng;

const KEY: &str = "secret";

fn ingestion(key: Option<&str>) -> Arc<IngestionService> {
    let repository: SharedRepository = Arc::new(InMemoryRepository::new());
    let hasher = key.map(|k| Arc::new(HmacMetricHasher::new(k)) as Arc<dyn MetricHasher>);
    Arc::new(IngestionService::new(repository, hasher))
}

async fn client_with(state: ServerState) -> Client {
    Client::tracked(rocket(state))
        .await
        .expect("valid rocket instance")
}

async fn client() -> Client {
    client_with(ServerState::new(ingestion(None)).expect("state")).await
}

async fn body(response: rocket::local::asynchronous::LocalResponse<'_>) -> String {
    response.into_string().await.unwrap_or_default()
}

#[rocket::async_test]
async fn test_gauge_path_update_and_read() {
    let client = client().await;

    let response = client.post("/update/gauge/Alloc/0.5").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.get("/value/gauge/Alloc").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response).await, "0.500");
}

#[rocket::async_test]
async fn test_counter_path_updates_accumulate() {
    let client = client().await;

    for _ in 0..2 {
        let response = client.post("/update/counter/RandomValue/4").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
    }

    let response = client.get("/value/counter/RandomValue").dispatch().await;
    assert_eq!(body(response).await, "8");
}

#[rocket::async_test]
async fn test_unknown_metric_is_not_found() {
    let client = client().await;

    let response = client.get("/value/counter/Unknown").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response).await, "Unknown does not exist in Counter db\n");
}

#[rocket::async_test]
async fn test_unknown_type_on_path_update_is_not_implemented() {
    let client = client().await;

    let response = client.post("/update/histogram/Alloc/1").dispatch().await;
    assert_eq!(response.status(), Status::NotImplemented);
    assert_eq!(body(response).await, "Metric type unknown!\n");
}

#[rocket::async_test]
async fn test_unparsable_values_are_bad_requests() {
    let client = client().await;

    let response = client.post("/update/gauge/Alloc/none").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await, "Metric must be float!\n");

    let response = client.post("/update/counter/PollCount/1.5").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await, "Metric must be int!\n");
}

#[rocket::async_test]
async fn test_writes_outside_trusted_subnet_are_forbidden() {
    let state = ServerState::new(ingestion(None))
        .expect("state")
        .with_trusted_subnet(Some("10.0.0.0/8".parse().expect("subnet")));
    let client = client_with(state).await;

    let response = client.post("/update/gauge/Alloc/1").dispatch().await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .post("/update/gauge/Alloc/1")
        .header(Header::new("X-Real-IP", "192.168.1.1"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
    assert_eq!(body(response).await, "IP address is not inside trusted network\n");

    let response = client
        .post("/update/gauge/Alloc/1")
        .header(Header::new("X-Real-IP", "10.1.2.3"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    // Reads are not gated
    let response = client.get("/value/gauge/Alloc").dispatch().await;
    assert_eq!(body(response).await, "1.000");
}

#[rocket::async_test]
async fn test_json_update_requires_valid_hash_when_keyed() {
    let client = client_with(ServerState::new(ingestion(Some(KEY))).expect("state")).await;
    let hasher = HmacMetricHasher::new(KEY);

    let signed = hasher.signed(&Metrics::gauge("Alloc", 1.25)).expect("sign");
    let response = client
        .post("/update/")
        .header(ContentType::JSON)
        .body(serde_json::to_string(&signed).expect("json"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let stored: Metrics = response.into_json().await.expect("metric reply");
    assert_eq!(stored.value, Some(1.25));

    let mut tampered = signed.clone();
    tampered.value = Some(9.0);
    let response = client
        .post("/update/")
        .header(ContentType::JSON)
        .body(serde_json::to_string(&tampered).expect("json"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let unsigned = Metrics::gauge("Alloc", 3.0);
    let response = client
        .post("/update/")
        .header(ContentType::JSON)
        .body(serde_json::to_string(&unsigned).expect("json"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client.get("/value/gauge/Alloc").dispatch().await;
    assert_eq!(body(response).await, "1.250");
}

#[rocket::async_test]
async fn test_json_endpoints_require_json_content_type() {
    let client = client().await;

    let response = client
        .post("/update/")
        .header(ContentType::Plain)
        .body(r#"{"id":"Alloc","type":"gauge","value":1}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await, "This endpoint accepts only jsons\n");
}

#[rocket::async_test]
async fn test_gzip_batch_is_applied() {
    let client = client().await;
    let batch = vec![
        Metrics::counter("PollCount", 2),
        Metrics::gauge("Alloc", 7.5),
        Metrics::counter("PollCount", 3),
    ];
    let compressed = gzip::compress(&serde_json::to_vec(&batch).expect("json")).expect("gzip");

    let response = client
        .post("/updates/")
        .header(ContentType::JSON)
        .header(Header::new("Content-Encoding", "gzip"))
        .body(compressed)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response).await, r#"{"updated":3}"#);

    let response = client.get("/value/counter/PollCount").dispatch().await;
    assert_eq!(body(response).await, "5");
    let response = client.get("/value/gauge/Alloc").dispatch().await;
    assert_eq!(body(response).await, "7.500");
}

#[rocket::async_test]
async fn test_batch_with_bad_entry_changes_nothing() {
    let client = client().await;
    let body_json = r#"[{"id":"PollCount","type":"counter","delta":1},{"id":"Alloc","type":"gauge"}]"#;

    let response = client
        .post("/updates/")
        .header(ContentType::JSON)
        .body(body_json)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client.get("/value/counter/PollCount").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_unknown_content_encoding_is_rejected() {
    let client = client().await;

    let response = client
        .post("/updates/")
        .header(ContentType::JSON)
        .header(Header::new("Content-Encoding", "br"))
        .body("[]")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn test_encrypted_batch_is_decrypted() {
    let private = RsaPrivateKey::new(&mut OsRng, 1024).expect("generate key");
    let encryptor = PayloadEncryptor::new(private.to_public_key()).expect("encryptor");
    let state = ServerState::new(ingestion(None))
        .expect("state")
        .with_decryptor(Some(PayloadDecryptor::new(private)));
    let client = client_with(state).await;

    let batch = vec![Metrics::gauge("TotalMemory", 1024.0)];
    let envelope = seal(&serde_json::to_vec(&batch).expect("json"), Some(&encryptor)).expect("seal");

    let response = client
        .post("/updates/")
        .header(ContentType::JSON)
        .header(Header::new("Content-Encoding", envelope.encoding.as_str()))
        .body(envelope.body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.get("/value/gauge/TotalMemory").dispatch().await;
    assert_eq!(body(response).await, "1024.000");
}

#[rocket::async_test]
async fn test_encrypted_batch_without_private_key_is_rejected() {
    let private = RsaPrivateKey::new(&mut OsRng, 1024).expect("generate key");
    let encryptor = PayloadEncryptor::new(private.to_public_key()).expect("encryptor");
    let client = client().await;

    let envelope = seal(b"[]", Some(&encryptor)).expect("seal");
    let response = client
        .post("/updates/")
        .header(ContentType::JSON)
        .header(Header::new("Content-Encoding", envelope.encoding.as_str()))
        .body(envelope.body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn test_value_lookup_is_signed_and_gzipped() {
    let client = client_with(ServerState::new(ingestion(Some(KEY))).expect("state")).await;
    client.post("/update/counter/PollCount/6").dispatch().await;

    let response = client
        .post("/value/")
        .header(ContentType::JSON)
        .header(Header::new("Accept-Encoding", "gzip, deflate"))
        .body(r#"{"id":"PollCount","type":"counter"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.headers().get_one("Content-Encoding"), Some("gzip"));

    let packed = response.into_bytes().await.expect("body");
    let found: Metrics = serde_json::from_slice(&gzip::decompress(&packed).expect("gunzip")).expect("json");
    assert_eq!(found.delta, Some(6));
    assert!(HmacMetricHasher::new(KEY).verify(&found).is_ok());
}

#[rocket::async_test]
async fn test_value_lookup_checks_supplied_hash_when_keyed() {
    let client = client_with(ServerState::new(ingestion(Some(KEY))).expect("state")).await;
    client.post("/update/gauge/Alloc/1.25").dispatch().await;
    let current = HmacMetricHasher::new(KEY)
        .sign(&Metrics::gauge("Alloc", 1.25))
        .expect("sign");
    let query = Metrics::query("Alloc", MetricKind::Gauge).with_hash(current);
    let query = serde_json::to_string(&query).expect("json");

    let response = client
        .post("/value/")
        .header(ContentType::JSON)
        .body(query.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    client.post("/update/gauge/Alloc/2.5").dispatch().await;
    let response = client
        .post("/value/")
        .header(ContentType::JSON)
        .body(query)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn test_value_lookup_of_missing_metric() {
    let client = client().await;

    let response = client
        .post("/value/")
        .header(ContentType::JSON)
        .body(r#"{"id":"Alloc","type":"gauge"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response).await, "Alloc does not exist in Gauge db\n");
}

#[rocket::async_test]
async fn test_listing_page() {
    let ingestion = ingestion(None);
    ingestion
        .update(&Metrics::from_value("PollCount", MetricValue::Counter(3)))
        .await
        .expect("counter");
    ingestion.update(&Metrics::gauge("Alloc", 0.25)).await.expect("gauge");
    let client = client_with(ServerState::new(ingestion).expect("state")).await;

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::HTML));
    assert!(response.headers().get_one("Content-Encoding").is_none());
    let html = body(response).await;
    assert!(html.contains("<li>[PollCount]: [3]</li>"));
    assert!(html.contains("<li>[Alloc]: [0.250]</li>"));

    let response = client
        .get("/")
        .header(Header::new("Accept-Encoding", "gzip"))
        .dispatch()
        .await;
    assert_eq!(response.headers().get_one("Content-Encoding"), Some("gzip"));
    let packed = response.into_bytes().await.expect("body");
    let html = String::from_utf8(gzip::decompress(&packed).expect("gunzip")).expect("utf8");
    assert!(html.contains("<h1>Counter</h1>"));
    assert!(html.contains("<li>[Alloc]: [0.250]</li>"));
}

#[rocket::async_test]
async fn test_ping() {
    let client = client().await;

    let response = client.get("/ping").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}

#[rocket::async_test]
async fn test_unknown_route_has_plain_text_body() {
    let client = client().await;

    let response = client.get("/metrics").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert!(body(response).await.ends_with('\n'));
}
