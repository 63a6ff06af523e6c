//! Request guards

use std::convert::Infallible;

use mcol_domain::constants::{GZIP_CONTENT_ENCODING, REAL_IP_HEADER};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use tracing::warn;

use super::responses::ApiError;
use crate::state::ServerState;

/// Caller whose `X-Real-IP` is inside the trusted subnet
///
/// Always succeeds when no subnet is configured.
pub struct TrustedCaller;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for TrustedCaller {
    type Error = ApiError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = req.rocket().state::<ServerState>() else {
            let e = ApiError::new(Status::InternalServerError, "Server state is not managed");
            return Outcome::Error((e.status, e));
        };

        let caller = req.headers().get_one(REAL_IP_HEADER);
        match state.authorize(caller) {
            Ok(()) => Outcome::Success(Self),
            Err(e) => {
                warn!(caller = ?caller, error = %e, "[HTTP] Write from untrusted address refused");
                let e = ApiError::from(e);
                Outcome::Error((e.status, e))
            }
        }
    }
}

/// Whether the client accepts gzip responses
pub struct AcceptEncoding {
    gzip: bool,
}

impl AcceptEncoding {
    pub fn gzip(&self) -> bool {
        self.gzip
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AcceptEncoding {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let gzip = req
            .headers()
            .get("Accept-Encoding")
            .any(|value| value.contains(GZIP_CONTENT_ENCODING));
        Outcome::Success(Self { gzip })
    }
}
