//! KaziNiKazi API server library.
//!
//! Exposes config, state, error handling, identity extraction and routes so
//! integration tests and the binary entrypoint share them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod payment;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
