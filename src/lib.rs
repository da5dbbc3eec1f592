//! Preimage upload library: sign, broadcast and confirm registry transactions.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod upload;

pub use config::UploadConfig;
pub use lifecycle::Shutdown;
pub use upload::Uploader;
