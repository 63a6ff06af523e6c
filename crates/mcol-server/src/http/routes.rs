//! HTTP endpoints and catchers

use mcol_domain::{MetricKind, Metrics};
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::serde::json::Json;
use rocket::{State, catch, get, post};
use tracing::error;

use super::guards::{AcceptEncoding, TrustedCaller};
use super::payload::JsonPayload;
use super::responses::{ApiError, BatchReply, Packed};
use crate::state::ServerState;

/// `POST /update/<kind>/<name>/<value>`
///
/// Unknown kinds answer 501, unparsable values 400. Path updates carry no
/// hash.
#[post("/update/<kind>/<name>/<value>")]
pub async fn update_from_path(
    kind: &str,
    name: &str,
    value: &str,
    caller: Result<TrustedCaller, ApiError>,
    state: &State<ServerState>,
) -> Result<&'static str, ApiError> {
    caller?;
    let kind = kind
        .parse::<MetricKind>()
        .map_err(|_| ApiError::new(Status::NotImplemented, "Metric type unknown!"))?;
    state.ingestion.update_raw(kind, name, value).await?;
    Ok("ok")
}

/// `POST /update/` with one JSON metric; replies with the stored value
#[post("/update", data = "<payload>")]
pub async fn update_json(
    caller: Result<TrustedCaller, ApiError>,
    payload: Result<JsonPayload<Metrics>, ApiError>,
    state: &State<ServerState>,
) -> Result<Json<Metrics>, ApiError> {
    caller?;
    let metric = payload?.into_inner();
    let stored = state.ingestion.update(&metric).await?;
    Ok(Json(Metrics::from_value(metric.id, stored)))
}

/// `POST /updates/` with a JSON array applied as one unit
#[post("/updates", data = "<payload>")]
pub async fn update_batch(
    caller: Result<TrustedCaller, ApiError>,
    payload: Result<JsonPayload<Vec<Metrics>>, ApiError>,
    state: &State<ServerState>,
) -> Result<Json<BatchReply>, ApiError> {
    caller?;
    let batch = payload?.into_inner();
    let updated = state.ingestion.update_batch(&batch).await?;
    Ok(Json(BatchReply { updated }))
}

/// `GET /value/<kind>/<name>`: counters as integers, gauges with three decimals
#[get("/value/<kind>/<name>")]
pub async fn value_from_path(
    kind: &str,
    name: &str,
    state: &State<ServerState>,
) -> Result<String, ApiError> {
    let kind = kind.parse::<MetricKind>().map_err(|_| {
        ApiError::new(Status::NotFound, format!("{kind} is not a metric type"))
    })?;
    Ok(state.ingestion.value(kind, name).await?.to_string())
}

/// `POST /value/` with `{"id", "type"}`
///
/// With a key set, a supplied hash is checked and the reply is signed.
#[post("/value", data = "<payload>")]
pub async fn value_json(
    payload: Result<JsonPayload<Metrics>, ApiError>,
    accept: AcceptEncoding,
    state: &State<ServerState>,
) -> Result<Packed, ApiError> {
    let query = payload?.into_inner();
    let found = state.ingestion.lookup(&query).await?;
    let body = serde_json::to_vec(&found).map_err(mcol_domain::Error::from)?;
    Packed::new(ContentType::JSON, body, accept.gzip())
}

/// `GET /ping`: storage health
#[get("/ping")]
pub async fn ping(state: &State<ServerState>) -> Result<&'static str, ApiError> {
    state.ingestion.ping().await.map_err(|e| {
        error!(error = %e, "[HTTP] Storage ping failed");
        ApiError::new(Status::InternalServerError, "Ping failed")
    })?;
    Ok("ok")
}

/// `GET /`: HTML listing of every metric
#[get("/")]
pub async fn listing(
    accept: AcceptEncoding,
    state: &State<ServerState>,
) -> Result<Packed, ApiError> {
    let listing = state.ingestion.listing().await?;
    let html = state.listing.render(&listing)?;
    Packed::new(ContentType::HTML, html.into_bytes(), accept.gzip())
}

#[catch(400)]
pub fn bad_request(_: &Request<'_>) -> &'static str {
    "Bad request\n"
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> String {
    format!("{} not found\n", req.uri().path())
}

#[catch(422)]
pub fn unprocessable(_: &Request<'_>) -> &'static str {
    "Request could not be processed\n"
}

#[catch(500)]
pub fn internal_error(_: &Request<'_>) -> &'static str {
    "Internal server error\n"
}

#[catch(default)]
pub fn default_catcher(status: Status, _: &Request<'_>) -> String {
    format!("{status}\n")
}
