//! JSON body data guard
//!
//! Requires `Content-Type: application/json`, then undoes the
//! `Content-Encoding` framing (`gzip`, or `64base` with the server's private
//! key) before deserializing.

use mcol_infrastructure::codec;
use rocket::data::{self, Data, FromData, Limits};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::Request;
use serde::de::DeserializeOwned;

use super::responses::ApiError;
use crate::state::ServerState;

/// Decoded JSON body
pub struct JsonPayload<T>(pub T);

impl<T> JsonPayload<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[rocket::async_trait]
impl<'r, T: DeserializeOwned + Send> FromData<'r> for JsonPayload<T> {
    type Error = ApiError;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        match decode(req, data).await {
            Ok(value) => Outcome::Success(Self(value)),
            Err(e) => Outcome::Error((e.status, e)),
        }
    }
}

async fn decode<T: DeserializeOwned>(req: &Request<'_>, data: Data<'_>) -> Result<T, ApiError> {
    if !req.content_type().is_some_and(|ct| ct.is_json()) {
        return Err(ApiError::new(
            Status::BadRequest,
            "This endpoint accepts only jsons",
        ));
    }

    let limit = req.limits().get("json").unwrap_or(Limits::JSON);
    let body = data.open(limit).into_bytes().await.map_err(|e| {
        ApiError::new(Status::BadRequest, format!("Request body could not be read: {e}"))
    })?;
    if !body.is_complete() {
        return Err(ApiError::new(
            Status::PayloadTooLarge,
            format!("Request body exceeds {limit}"),
        ));
    }

    let encodings: Vec<&str> = req.headers().get("Content-Encoding").collect();
    let decryptor = req
        .rocket()
        .state::<ServerState>()
        .and_then(|state| state.decryptor.as_ref());
    let json = codec::open(&body.into_inner(), &encodings, decryptor)?;

    serde_json::from_slice(&json).map_err(|e| {
        ApiError::new(Status::BadRequest, format!("Metric json cannot be decoded: {e}"))
    })
}
