//! Gateway API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! API routes are nested under `/api/` behind CORS and the upload body
//! limit; `/health` is mounted at the root. Every request passes through
//! the access log.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the gateway router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    let cors = cors_layer(&ctx.core.config.allowed_origins);
    let body_limit = DefaultBodyLimit::max(ctx.core.config.max_upload_bytes);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/upload", post(endpoints::documents::upload))
        .route("/status", get(endpoints::status::missing_id))
        .route("/status/", get(endpoints::status::missing_id))
        .route("/status/:document_id", get(endpoints::status::check))
        .route("/query", post(endpoints::query::ask))
        .route("/generate_strategy", post(endpoints::strategy::generate))
        .with_state(ctx)
        .layer(body_limit)
        .layer(cors);

    Router::new()
        .route("/health", get(endpoints::health::check))
        .nest("/api", api)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
}

/// CORS for the browser dashboard: listed origins only, with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}
