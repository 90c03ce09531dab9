//! HTTP routes for COM:PASS
//!
//! Shared response/body helpers live here; each endpoint group has its own
//! module. All handlers return `Response<BoxBody>` and map domain errors to
//! HTTP statuses through `error_response`.

pub mod auth_routes;
pub mod client_access;
pub mod health;
pub mod insight;
pub mod journal;
pub mod mentor;
pub mod notifications;
pub mod plan;
pub mod settings;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::types::CompassError;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Maximum accepted JSON body size
const MAX_BODY_BYTES: usize = 65536;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap_or_else(|_| Response::new(empty_body()))
}

/// Map a domain error to its HTTP status and stable error code
pub fn error_response(err: &CompassError) -> Response<BoxBody> {
    let (status, code) = match err {
        CompassError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        CompassError::Auth(_) => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
        CompassError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        CompassError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        CompassError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        CompassError::Mail(_) => (StatusCode::BAD_GATEWAY, "EMAIL_DELIVERY_FAILED"),
        CompassError::Http(_) | CompassError::Json(_) => {
            (StatusCode::BAD_REQUEST, "BAD_REQUEST")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };

    json_response(
        status,
        &ErrorResponse {
            error: err.to_string(),
            code: Some(code.to_string()),
        },
    )
}

pub fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap_or_else(|_| Response::new(empty_body()))
}

pub fn not_found(path: &str) -> Response<BoxBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorResponse {
            error: format!("No route for {path}"),
            code: Some("NOT_FOUND".to_string()),
        },
    )
}

pub async fn parse_json_body<T, B>(req: Request<B>) -> Result<T, CompassError>
where
    T: for<'de> Deserialize<'de>,
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // Reject declared-oversized bodies before reading anything
    if let Some(len) = req
        .headers()
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
    {
        if len > MAX_BODY_BYTES {
            return Err(CompassError::Http("Request body too large".into()));
        }
    }

    // Limited stops the read at the cap, so an unannounced large body is
    // never buffered whole
    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| CompassError::Http(format!("Failed to read body: {e}")))?;

    serde_json::from_slice(&body.to_bytes())
        .map_err(|e| CompassError::Http(format!("Invalid JSON: {e}")))
}

pub fn get_auth_header(req: &Request<Incoming>) -> Option<&str> {
    req.headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Parse a simple `?key=value&...` query string value
pub fn query_param<'a>(query: Option<&'a str>, key: &str) -> Option<&'a str> {
    query?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then_some(v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Echo {
        value: String,
    }

    #[tokio::test]
    async fn test_parse_json_body_roundtrip() {
        let req = Request::builder()
            .body(Full::new(Bytes::from(r#"{"value":"hi"}"#)))
            .unwrap();
        let parsed: Echo = parse_json_body(req).await.unwrap();
        assert_eq!(parsed.value, "hi");
    }

    #[tokio::test]
    async fn test_parse_json_body_rejects_oversized_stream() {
        // No Content-Length header; the cap must hold on the body read itself
        let big = vec![b'{'; MAX_BODY_BYTES + 1];
        let req = Request::builder()
            .body(Full::new(Bytes::from(big)))
            .unwrap();
        let err = parse_json_body::<serde_json::Value, _>(req).await.unwrap_err();
        assert!(matches!(err, CompassError::Http(_)));
    }

    #[tokio::test]
    async fn test_parse_json_body_rejects_declared_oversized_length() {
        let req = Request::builder()
            .header(
                hyper::header::CONTENT_LENGTH,
                (MAX_BODY_BYTES + 1).to_string(),
            )
            .body(Full::new(Bytes::new()))
            .unwrap();
        let err = parse_json_body::<serde_json::Value, _>(req).await.unwrap_err();
        assert!(matches!(err, CompassError::Http(_)));
    }

    #[test]
    fn test_query_param() {
        assert_eq!(query_param(Some("mode=free_talk&limit=5"), "mode"), Some("free_talk"));
        assert_eq!(query_param(Some("mode=free_talk"), "limit"), None);
        assert_eq!(query_param(None, "mode"), None);
    }
}
