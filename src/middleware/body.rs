//! Request body extractor for resource payloads.
//!
//! Buffers the body under the router's size limit and remembers whether it was
//! sent as a urlencoded form. Buffering failures are answered with the JSON error
//! body like every other error.

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::models::payload::{parse_body, parse_form};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Form,
}

impl BodyFormat {
    /// Anything that is not declared as a urlencoded form is read as JSON
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let is_form = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map_or(false, |mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"));

        if is_form {
            BodyFormat::Form
        } else {
            BodyFormat::Json
        }
    }
}

#[derive(Debug)]
pub struct RequestBody {
    format: BodyFormat,
    bytes: Bytes,
}

impl RequestBody {
    /// Decode the buffered body. An empty body decodes as `T::default()`.
    pub fn parse<T>(&self) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let parsed = match self.format {
            BodyFormat::Json => parse_body(&self.bytes).map_err(|e| e.to_string()),
            BodyFormat::Form => parse_form(&self.bytes).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| ApiError::invalid_json(format!("Invalid request body: {}", e)))
    }
}

#[async_trait]
impl<S> FromRequest<S> for RequestBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let format = BodyFormat::from_headers(req.headers());
        let bytes = Bytes::from_request(req, state).await.map_err(buffering_failed)?;
        Ok(Self { format, bytes })
    }
}

fn buffering_failed(rejection: BytesRejection) -> ApiError {
    let status = rejection.status();
    let message = rejection.body_text();
    tracing::warn!(%status, "rejected request body: {}", message);

    match status {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large(message),
        s if s.is_server_error() => ApiError::internal_server_error(message),
        _ => ApiError::bad_request(message),
    }
}
