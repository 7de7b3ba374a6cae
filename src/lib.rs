//! homework-bot - Practicum review status notifier
//!
//! Polls the homework status endpoint on a fixed interval and sends a Telegram
//! message whenever the newest homework changes status.

pub mod cli;
pub mod config;
pub mod error;
pub mod homework;
pub mod notify;
pub mod poller;
pub mod practicum;

pub use error::{ConfigError, CycleError};
