//! Request correlation middleware.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation ID stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(#[allow(dead_code)] pub String);

fn incoming_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(&REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Tags every request with a correlation ID and logs its outcome.
///
/// An incoming `x-request-id` header is honored so upstream proxies can
/// thread their own IDs through; otherwise a fresh UUID v4 is minted.
/// The ID is echoed back in the response headers.
pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let id = incoming_id(req.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(RequestId(id.clone()));

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let mut response = next.run(req).await;

    tracing::info!(
        request_id = %id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID.clone(), value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_id_honored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc-123"));
        assert_eq!(incoming_id(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn test_empty_incoming_id_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static(""));
        assert_eq!(incoming_id(&headers), None);
        assert_eq!(incoming_id(&HeaderMap::new()), None);
    }
}
