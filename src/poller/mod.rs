//! Poll loop - fetch, validate, detect, notify, sleep, repeat
//!
//! The poller owns all cross-cycle state and is the only place where cycle
//! errors are caught, announced to the chat, and de-duplicated.

pub mod controller;
pub mod state;

pub use controller::{CycleOutcome, Poller, PollerConfig};
pub use state::LoopState;
