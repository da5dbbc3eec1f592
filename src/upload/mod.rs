//! Upload orchestration.
//!
//! # Data Flow
//! ```text
//! preimage bytes
//!     → Uploader::prepare  (hash, encode, fresh nonce, sign)
//!     → Uploader::submit   (broadcast once)
//!     → Uploader::confirm  (poll until terminal, classify receipt status)
//!     → Uploader::verify   (optional registry read-back)
//!     → Completion         (printed lines and exit status)
//! ```

pub mod error;
pub mod outcome;
pub mod uploader;

pub use error::{UploadError, UploadResult};
pub use outcome::Completion;
pub use uploader::{PreparedUpload, UploadReport, Uploader};
