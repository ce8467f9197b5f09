//! Error types for hexapod_link.

use thiserror::Error;

/// Failures on the command path.  None of these are fatal to the console;
/// a closed channel simply means updates are dropped.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The command snapshot could not be turned into JSON.
    #[error("failed to serialize control packet: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The channel's I/O thread has gone away.
    #[error("channel to {url} is closed")]
    ChannelClosed {
        /// Endpoint the channel was opened against.
        url: String,
    },

    /// The I/O thread or its runtime could not be started.
    #[error("failed to start channel runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Result type for the command path.
pub type Result<T> = std::result::Result<T, LinkError>;
