//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the base software: the messages exchanged
//! with the sensor drivers, the operator input device, the closed-loop controllers and the
//! actuator drivers, and (with the `net` feature) the network transport carrying them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Inbound and outbound message definitions
pub mod msg;

/// Network module
#[cfg(feature = "net")]
pub mod net;
