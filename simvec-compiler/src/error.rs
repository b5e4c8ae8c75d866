//! Error types for gate fusion

use thiserror::Error;

/// Errors that can occur while fusing a gate list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FusionError {
    /// A gate's time precedes its predecessor's; the input is not a valid
    /// time-ordered circuit
    #[error("gate times should be ordered: time {time} follows {previous}")]
    UnorderedTimes { time: u32, previous: u32 },
}

/// Result type for fusion operations
pub type Result<T> = std::result::Result<T, FusionError>;
