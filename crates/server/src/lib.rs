//! Admin HTTP endpoint for the class relay.
//!
//! The binary in `main.rs` wires this router together with the command
//! listener from the core crate.

pub mod api;
pub mod metrics;
pub mod state;
