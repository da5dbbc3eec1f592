//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI overrides (main.rs)
//!     → UploadConfig (validated, immutable)
//!     → passed by value into client, builder and watcher
//! ```
//!
//! # Design Decisions
//! - Config is an explicit value, never a process-wide global
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The private key is not part of the file; it comes from the environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::UploadConfig;
pub use schema::{ConfirmationConfig, NetworkConfig, ObservabilityConfig, TransactionConfig};
pub use validation::{validate_config, ValidationError};
