//! Liveness probe.

use axum::Json;
use serde_json::{json, Value};

/// GET /api/v1/ping
pub async fn ping() -> Json<Value> {
    Json(json!({
        "message": "pong",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ping_answers_pong() {
        let Json(body) = ping().await;
        assert_eq!(body["message"], "pong");
        assert!(body["version"].is_string());
    }
}
