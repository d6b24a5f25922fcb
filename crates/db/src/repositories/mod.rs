//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod job_application_repo;
pub mod job_repo;
pub mod payment_release_repo;
pub mod work_session_repo;

pub use job_application_repo::JobApplicationRepo;
pub use job_repo::JobRepo;
pub use payment_release_repo::PaymentReleaseRepo;
pub use work_session_repo::WorkSessionRepo;
