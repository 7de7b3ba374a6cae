//! Practicum API layer - the homework status endpoint
//!
//! This module provides:
//! - StatusSource trait so the poller can be driven by a test double
//! - PracticumClient, the reqwest implementation

pub mod client;

pub use client::{PollResponse, PracticumClient, StatusSource};
