//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscribed wait returns Canceled
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
