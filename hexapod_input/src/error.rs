//! Error types for hexapod_input.

use thiserror::Error;

/// Errors raised while building an input control.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    /// The control's pixel size cannot normalize pointer offsets.
    #[error("invalid joystick size: {0} (must be positive and finite)")]
    InvalidSize(f64),

    /// The handle does not fit inside the control.
    #[error("handle size {handle} exceeds control size {size}")]
    HandleTooLarge {
        /// Handle diameter in pixels.
        handle: f64,
        /// Control diameter in pixels.
        size: f64,
    },
}

/// Result type for input construction.
pub type Result<T> = std::result::Result<T, InputError>;
