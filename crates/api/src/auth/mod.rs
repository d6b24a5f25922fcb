//! Bearer-token identity.
//!
//! - [`jwt`] -- HS256 access-token validation (and generation for tests and
//!   tooling; login and registration live in the identity service).

pub mod jwt;
