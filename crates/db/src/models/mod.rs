//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching the
//! database row and, where rows are inserted from outside a repository, a
//! `Deserialize` create DTO.

pub mod job;
pub mod job_application;
pub mod payment_release;
pub mod work_session;
