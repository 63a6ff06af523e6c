//! Error and content-negotiated responders

use std::io::Cursor;

use mcol_domain::constants::GZIP_CONTENT_ENCODING;
use mcol_domain::error::Error;
use mcol_infrastructure::codec::gzip;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use serde::Serialize;
use tracing::{debug, error};

/// Plain text error reply, one line terminated by `\n`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Status,
    pub message: String,
}

impl ApiError {
    pub fn new<S: Into<String>>(status: Status, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// HTTP status of a domain error
pub fn status_of(error: &Error) -> Status {
    match error {
        Error::NotFound { .. } => Status::NotFound,
        Error::Forbidden { .. } => Status::Forbidden,
        Error::Unsupported { .. } => Status::NotImplemented,
        e if e.is_client_error() => Status::BadRequest,
        _ => Status::InternalServerError,
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = status_of(&error);
        let message = match &error {
            Error::NotFound { resource } => resource.clone(),
            Error::InvalidArgument { message }
            | Error::Forbidden { message }
            | Error::Unsupported { message } => message.clone(),
            other => other.to_string(),
        };
        if status.code >= 500 {
            error!(error = %error, "[HTTP] Request failed");
        } else {
            debug!(status = status.code, error = %error, "[HTTP] Request rejected");
        }
        Self::new(status, message)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        Response::build_from(format!("{}\n", self.message).respond_to(req)?)
            .status(self.status)
            .ok()
    }
}

/// Body of a successful batch write
#[derive(Debug, Serialize)]
pub struct BatchReply {
    pub updated: usize,
}

/// Body compressed with gzip when the client accepts it
pub struct Packed {
    content_type: ContentType,
    body: Vec<u8>,
    gzipped: bool,
}

impl Packed {
    pub fn new(content_type: ContentType, body: Vec<u8>, gzip: bool) -> Result<Self, ApiError> {
        let body = if gzip {
            gzip::compress(&body)?
        } else {
            body
        };
        Ok(Self {
            content_type,
            body,
            gzipped: gzip,
        })
    }
}

impl<'r> Responder<'r, 'static> for Packed {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut response = Response::build();
        response.header(self.content_type);
        if self.gzipped {
            response.raw_header("Content-Encoding", GZIP_CONTENT_ENCODING);
        }
        response
            .sized_body(self.body.len(), Cursor::new(self.body))
            .ok()
    }
}
