//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! builder, watcher, uploader
//!     → tracing events with structured fields (tx_hash, attempt, ...)
//!     → logging.rs subscriber (pretty or JSON, stderr)
//! ```

pub mod logging;

pub use logging::init_logging;
