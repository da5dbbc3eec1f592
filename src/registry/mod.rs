//! Preimage registry collaborators.
//!
//! # Data Flow
//! ```text
//! file bytes
//!     → addresser.rs (content identifier, for display and read-back)
//!     → encoder.rs (addPreimage calldata)
//!     → blockchain (sign, broadcast, confirm)
//!     → reader.rs (optional read-back of the stored size)
//! ```

pub mod addresser;
pub mod encoder;
pub mod reader;

use alloy::sol;

sol! {
    /// Registry precompile that stores preimages keyed by content hash.
    #[derive(Debug)]
    interface IPreimageRegistry {
        function addPreimage(bytes preimage) external returns (bytes32);
        function getPreimageSize(bytes32 hash) external view returns (uint256);
        function getPreimage(uint256 size, bytes32 hash) external view returns (bytes);
    }
}

pub use addresser::{ContentAddresser, Keccak256Addresser};
pub use encoder::{CallEncoder, RegistryEncoder, ADD_PREIMAGE};
pub use reader::PreimageRegistry;
