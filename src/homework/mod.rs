//! Homework domain - response validation, status text and change detection
//!
//! Everything in here is pure: no IO, only logging.

pub mod change;
pub mod response;
pub mod status;
pub mod types;

pub use change::should_notify;
pub use response::{resume_marker, validate};
pub use status::{describe, failure_message};
pub use types::{ReviewItem, ReviewStatus};
