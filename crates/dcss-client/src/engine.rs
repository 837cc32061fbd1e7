//! Frame engine: owns the session's incoming and outgoing line stream.
//!
//! The engine is pull-driven. There is no spawned reader task: the task
//! awaiting [`FrameEngine::read_frame`] is the single pumping task for
//! the connection, and frames are observed strictly in arrival order.
//! The bus interleaves replies to
//! explicit requests with unsolicited notifications on the same stream, so
//! the layers above route every frame read here through one dispatch path
//! before doing any specialized matching.

use dcss_core::{Error, Frame, FrameVariant, Result, Transport};
use tracing::trace;

/// Owns the transport and translates between lines and [`Frame`]s.
#[derive(Debug)]
pub struct FrameEngine<T> {
    transport: T,
}

impl<T: Transport> FrameEngine<T> {
    pub fn new(transport: T) -> Self {
        FrameEngine { transport }
    }

    /// Block until one complete frame arrives.
    ///
    /// Fails with [`Error::ConnectionClosed`] if the transport ends.
    /// Whitespace-only lines are transport keepalive artifacts, not
    /// frames, and are passed over.
    pub async fn read_frame(&mut self) -> Result<Frame> {
        loop {
            let line = self
                .transport
                .next_line()
                .await?
                .ok_or(Error::ConnectionClosed)?;
            let frame = Frame::new(line);
            if frame.name().is_empty() {
                continue;
            }
            trace!(frame = %frame, "frame received");
            return Ok(frame);
        }
    }

    /// Serialize one outgoing line using the requested framing variant.
    pub async fn send_frame(&mut self, variant: FrameVariant, line: &str) -> Result<()> {
        trace!(?variant, line, "sending frame");
        self.transport.send_line(variant, line).await
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Tear the engine down, recovering the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
