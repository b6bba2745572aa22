//! Shared types for the gateway API layer.

use std::sync::Arc;

use serde::Serialize;

use crate::core_state::CoreState;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Response bodies
// ═══════════════════════════════════════════════════════════

/// Body of a successful `POST /api/upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub message: String,
}
