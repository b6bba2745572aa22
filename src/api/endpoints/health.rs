//! Liveness check.

/// `GET /health`: plain-text liveness check. Touches no external service.
pub async fn check() -> &'static str {
    "OK"
}
