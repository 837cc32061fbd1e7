//! Error types for the DCSS client.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer, protocol-layer, and
//! session-layer errors are all captured here.

/// The error type for all DCSS client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A handshake or correlation frame arrived out of its expected shape.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The transport ended while a frame was being awaited.
    #[error("connection closed by bus")]
    ConnectionClosed,

    /// Master arbitration was lost to a rival peer.
    ///
    /// Raised only when a master-gated call re-checks the privilege; loss
    /// observed out-of-band is recorded silently in session state.
    #[error("master privilege unavailable")]
    MasterUnavailable,

    /// A diagnostic payload did not match its grammar, or a numeric field
    /// held a non-numeric token.
    #[error("parse error: {0}")]
    Parse(String),

    /// A terminal operation handle was reported on again.
    #[error("operation handle already reached a terminal state")]
    StaleHandle,

    /// An invalid parameter was passed to a client call.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A transport-level failure (socket setup, closed writer).
    #[error("transport error: {0}")]
    Transport(String),

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
