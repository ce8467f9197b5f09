//! Error types for telemetry decoding.

use thiserror::Error;

/// A telemetry payload that could not become a [`PoseFrame`](crate::PoseFrame).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not JSON, or not shaped like `{ "legs": [[[x, y, z], ...], ...] }`.
    #[error("malformed telemetry: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Wrong number of legs.
    #[error("expected {expected} legs, found {found}")]
    LegCount {
        /// Legs a frame must carry.
        expected: usize,
        /// Legs actually present.
        found: usize,
    },

    /// A leg with too few or too many joints.
    #[error("leg {leg} has {found} joints, expected {min} to {max}")]
    JointCount {
        /// Zero-based leg index.
        leg: usize,
        /// Joints actually present.
        found: usize,
        /// Fewest joints allowed.
        min: usize,
        /// Most joints allowed.
        max: usize,
    },

    /// A coordinate that is NaN or infinite.
    #[error("leg {leg} joint {joint} has a non-finite coordinate")]
    NonFinite {
        /// Zero-based leg index.
        leg: usize,
        /// Zero-based joint index within the leg.
        joint: usize,
    },
}

/// Result type for telemetry decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;
