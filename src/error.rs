//! Error types for the IRC client core.
//!
//! Decode failures are per-line and recoverable; connection-level failures
//! are terminal for the direction that hit them.

use std::fmt;

use thiserror::Error;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors encountered when decoding a raw line into an [`Event`].
///
/// [`Event`]: crate::Event
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventParseError {
    /// The line had fewer than the two tokens a well-formed event needs.
    #[error("invalid event format: {line:?}")]
    InvalidFormat {
        /// The raw line, terminator trimmed.
        line: String,
    },
}

/// Connection-level errors. Always fatal to the operation that hit them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer, or a pump's local source, reached end of stream.
    #[error("connection closed")]
    Closed,

    /// The operation needs a connection and none is installed.
    #[error("not connected")]
    NotConnected,
}

/// Which directional pump produced a [`PumpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Server-to-handlers pump.
    Inbound,
    /// Local-source-to-server pump.
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbound => f.write_str("inbound"),
            Self::Outbound => f.write_str("outbound"),
        }
    }
}

/// Terminal outcome of a pump loop: which pump stopped, how many bytes it
/// had read, and the failure that stopped it.
#[derive(Debug, Error)]
#[error("{direction} pump stopped after {bytes} bytes")]
pub struct PumpError {
    /// The pump that stopped.
    pub direction: Direction,
    /// Bytes read by the pump before it stopped.
    pub bytes: u64,
    /// The terminating failure.
    #[source]
    pub cause: ClientError,
}

impl PumpError {
    /// Build a pump outcome from its direction, byte count, and cause.
    #[must_use]
    pub fn new(direction: Direction, bytes: u64, cause: ClientError) -> Self {
        Self {
            direction,
            bytes,
            cause,
        }
    }
}
