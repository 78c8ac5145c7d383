//! Reference providers
//!
//! Concrete hardware drivers live outside this crate. These two cover the
//! host binary and tests: a provider that never produces data and one
//! that replays whatever the host queues on it.

pub mod null;
pub mod simulated;

pub use null::NullProvider;
pub use simulated::{HapticPulse, SimulatedProvider, SimulatedSettings};
