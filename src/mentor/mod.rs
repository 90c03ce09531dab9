//! Mentor-side domain logic: access checks, status classification, and the
//! dashboard / client-detail aggregations.

pub mod access;
pub mod client_detail;
pub mod dashboard;
pub mod status;

pub use access::{category_allowed, check_data_access, DataCategory};
pub use status::{determine_client_status, overall_progress, progress_percentage, ClientStatus};
