//! Request pipelines behind the HTTP endpoints.
//!
//! - `upload`: document → uploads bucket (starts the analysis job)
//! - `status`: check the results bucket for the finished report
//! - `rag`: knowledge-base retrieve-and-generate
//! - `strategy`: report → strategy document via a generative model
//!
//! Each pipeline validates its own input and converts provider failures into
//! its own error type. None of them calls another.

pub mod rag;
pub mod status;
pub mod strategy;
pub mod upload;
