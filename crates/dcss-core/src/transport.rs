//! Transport trait for bus communication.
//!
//! The [`Transport`] trait abstracts over the byte stream to the bus.
//! Implementations exist for TCP sockets (`dcss-transport`) and scripted
//! in-memory streams for testing (`dcss-test-harness`).
//!
//! The correlation layers above operate on whole lines: a transport is
//! responsible for delimiting incoming frames and for the byte layout of
//! the two outgoing framing variants. Everything above the transport is
//! encoding-agnostic beyond selecting a [`FrameVariant`] per call site.

use async_trait::async_trait;

use crate::error::Result;
use crate::frame::FrameVariant;

/// Line-level transport to the bus.
#[async_trait]
pub trait Transport: Send {
    /// Write one outgoing line using the requested framing variant.
    ///
    /// Implementations should not return until the bytes have been handed
    /// to the underlying stream.
    async fn send_line(&mut self, variant: FrameVariant, line: &str) -> Result<()>;

    /// Wait for the next incoming line.
    ///
    /// Returns `Ok(None)` once the bus has closed the stream. There is no
    /// internal timeout: the call suspends until a line arrives, the stream
    /// ends, or the underlying I/O fails.
    async fn next_line(&mut self) -> Result<Option<String>>;
}
