//! Pure domain logic for the airwatch telemetry agent.
//!
//! Nothing in this crate performs I/O. The agent crate fetches snapshots
//! and drives these types; everything here can be tested in isolation.

pub mod clock;
pub mod error;
pub mod metric;
pub mod severity;
pub mod thresholds;
pub mod types;
pub mod window;
