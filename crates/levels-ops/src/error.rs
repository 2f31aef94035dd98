//! Error types for levels operations.

use levels_core::Channel;
use thiserror::Error;

/// Error type for levels operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Input black and white points collapsed to the same integer value.
    ///
    /// The linear coefficient would divide by zero, so the frame is
    /// rejected instead of producing non-finite output.
    #[error("degenerate {channel} input range: black and white point both resolve to {value}")]
    DegenerateRange {
        /// Channel whose range collapsed
        channel: Channel,
        /// Shared integer value of both bounds
        value: i32,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Option name not recognized.
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// A frame arrived before the pixel format was negotiated.
    #[error("pixel format has not been negotiated")]
    NotNegotiated,

    /// Frame does not match the negotiated format.
    #[error("format mismatch: {0}")]
    FormatMismatch(String),

    /// Buffers have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Error from the core types (format, geometry, allocation).
    #[error(transparent)]
    Core(#[from] levels_core::Error),
}

impl OpsError {
    /// Returns `true` if the frame failed because an output buffer could
    /// not be allocated.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_allocation_error())
    }
}

/// Result type for levels operations.
pub type OpsResult<T> = Result<T, OpsError>;
