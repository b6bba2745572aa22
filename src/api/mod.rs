//! HTTP surface of the gateway.
//!
//! Routes are nested under `/api/` behind a CORS layer; `/health` sits at the
//! root for load balancers. Every handler borrows its clients from
//! `CoreState` and answers 503 when the one it needs was never constructed.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, GatewayServer, ServerError};
pub use types::ApiContext;
