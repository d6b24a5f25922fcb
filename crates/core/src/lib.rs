//! Domain logic for the KaziNiKazi work marketplace.
//!
//! This crate has no internal dependencies and performs no I/O. The database,
//! event and HTTP layers all build on the types defined here.

pub mod application;
pub mod error;
pub mod pagination;
pub mod payment;
pub mod roles;
pub mod types;
pub mod work_session;
