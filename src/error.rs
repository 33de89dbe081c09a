//! Error taxonomy for the streaming core and its configuration layer.
//!
//! The three data-path conditions are all locally recoverable:
//!
//! - **`OutOfOrderSample`**: an inbound sample's timestamp is older than the
//!   buffer tail. The sample is dropped and the buffer order is untouched.
//! - **`DimensionMismatch`**: a channel index outside `[0, n_channels)` was
//!   used. Consumers switch into an "invalid selection" display state.
//! - **`MalformedMessage`**: an inbound payload does not hold exactly one
//!   timestamp plus one value per channel. Nothing partial is pushed.
//!
//! The remaining variants cover transport and configuration I/O.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimscopeError>;

#[derive(Error, Debug)]
pub enum SimscopeError {
    #[error("out-of-order sample: t={time} is older than buffer tail t={tail}")]
    OutOfOrderSample { time: f64, tail: f64 },

    #[error("channel index {index} is outside the {channels} available channels")]
    DimensionMismatch { index: usize, channels: usize },

    #[error("malformed message: expected length {expected}, got {actual}")]
    MalformedMessage { expected: usize, actual: usize },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SimscopeError {
    /// `true` for the conditions that only drop one message or degrade one
    /// widget and never need to reach the user as a hard failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimscopeError::OutOfOrderSample { .. }
                | SimscopeError::DimensionMismatch { .. }
                | SimscopeError::MalformedMessage { .. }
                | SimscopeError::Transport(_)
        )
    }
}
