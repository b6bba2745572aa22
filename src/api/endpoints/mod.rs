//! API endpoint handlers, one module per route family.

pub mod documents;
pub mod health;
pub mod query;
pub mod status;
pub mod strategy;
