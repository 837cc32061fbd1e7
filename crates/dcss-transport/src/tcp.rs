//! TCP transport for bus communication.
//!
//! This module provides [`TcpTransport`], which implements the
//! [`Transport`] trait over a TCP connection to the bus (port 14243 on
//! the standard deployment).
//!
//! # Wire layout
//!
//! Incoming frames are newline-delimited text, one frame per line.
//! Outgoing frames use one of two layouts selected by [`FrameVariant`]:
//!
//! - [`FrameVariant::Handshake`]: the line is written into a fixed-width
//!   block of [`HANDSHAKE_FRAME_LEN`] bytes, NUL-padded. Used only for
//!   the login identity frame.
//! - [`FrameVariant::Command`]: the line followed by `\n`.
//!
//! # Example
//!
//! ```no_run
//! use dcss_core::{FrameVariant, Transport};
//! use dcss_transport::TcpTransport;
//!
//! # async fn example() -> dcss_core::Result<()> {
//! let mut transport = TcpTransport::connect("bl31-control:14243").await?;
//! transport
//!     .send_line(FrameVariant::Command, "gtos_become_master force")
//!     .await?;
//! while let Some(line) = transport.next_line().await? {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, trace, warn};

use dcss_core::{Error, FrameVariant, Result, Transport};

/// Default connection timeout (5 seconds).
///
/// Generous enough for a control network; short enough that a script
/// pointed at the wrong host fails promptly. This is the only timeout in
/// the transport -- established-connection reads suspend indefinitely,
/// as the layers above require.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Fixed block size of the handshake framing variant.
pub const HANDSHAKE_FRAME_LEN: usize = 200;

/// TCP transport to the bus.
#[derive(Debug)]
pub struct TcpTransport {
    /// Buffered read half, `None` after `close()`.
    reader: Option<BufReader<OwnedReadHalf>>,
    /// Write half, `None` after `close()`.
    writer: Option<OwnedWriteHalf>,
    /// The address string for logging.
    addr: String,
}

impl TcpTransport {
    /// Connect to a bus endpoint using the default timeout.
    pub async fn connect(addr: &str) -> Result<Self> {
        Self::connect_with_timeout(addr, DEFAULT_CONNECT_TIMEOUT).await
    }

    /// Connect to a bus endpoint with a specified timeout.
    pub async fn connect_with_timeout(addr: &str, timeout: Duration) -> Result<Self> {
        debug!(addr = %addr, timeout_ms = timeout.as_millis(), "connecting to bus");

        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::Transport(format!("connection to {addr} timed out")))?
            .map_err(|e| map_connect_error(e, addr))?;

        // Command frames are small and latency-sensitive.
        if let Err(e) = stream.set_nodelay(true) {
            warn!(addr = %addr, error = %e, "failed to set TCP_NODELAY (continuing anyway)");
        }

        debug!(addr = %addr, "connected to bus");
        Ok(Self::from_stream(stream, addr.to_string()))
    }

    /// Wrap an existing `TcpStream`, e.g. one accepted from a listener in
    /// tests.
    pub fn from_stream(stream: TcpStream, addr: String) -> Self {
        let (read_half, write_half) = stream.into_split();
        TcpTransport {
            reader: Some(BufReader::new(read_half)),
            writer: Some(write_half),
            addr,
        }
    }

    /// The address string this transport was connected to.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Whether the transport is still open.
    pub fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    /// Close the connection. Subsequent sends and reads fail.
    pub async fn close(&mut self) -> Result<()> {
        self.reader.take();
        if let Some(mut writer) = self.writer.take() {
            debug!(addr = %self.addr, "closing bus connection");
            if let Err(e) = writer.shutdown().await {
                warn!(addr = %self.addr, error = %e, "failed to shut down TCP stream (continuing anyway)");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send_line(&mut self, variant: FrameVariant, line: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Transport("transport is closed".to_string()))?;

        let encoded = encode_line(variant, line)?;
        trace!(addr = %self.addr, ?variant, line, "sending line");

        writer.write_all(&encoded).await.map_err(map_io_error)?;
        writer.flush().await.map_err(map_io_error)?;
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| Error::Transport("transport is closed".to_string()))?;

        let mut line = String::new();
        let n = reader.read_line(&mut line).await.map_err(map_io_error)?;
        if n == 0 {
            debug!(addr = %self.addr, "bus closed the connection");
            return Ok(None);
        }
        let trimmed = line.trim_end_matches('\n').trim_end_matches('\r');
        trace!(addr = %self.addr, line = trimmed, "line received");
        Ok(Some(trimmed.to_string()))
    }
}

/// Encode one outgoing line in the requested framing variant.
fn encode_line(variant: FrameVariant, line: &str) -> Result<BytesMut> {
    match variant {
        FrameVariant::Handshake => {
            if line.len() >= HANDSHAKE_FRAME_LEN {
                return Err(Error::InvalidParameter(format!(
                    "handshake frame of {} bytes exceeds the {HANDSHAKE_FRAME_LEN}-byte block",
                    line.len()
                )));
            }
            let mut buf = BytesMut::with_capacity(HANDSHAKE_FRAME_LEN);
            buf.put_slice(line.as_bytes());
            buf.resize(HANDSHAKE_FRAME_LEN, 0);
            Ok(buf)
        }
        FrameVariant::Command => {
            let mut buf = BytesMut::with_capacity(line.len() + 1);
            buf.put_slice(line.as_bytes());
            buf.put_u8(b'\n');
            Ok(buf)
        }
    }
}

/// Map a connection-time I/O error to the appropriate [`Error`] variant.
fn map_connect_error(e: std::io::Error, addr: &str) -> Error {
    match e.kind() {
        std::io::ErrorKind::ConnectionRefused => {
            Error::Transport(format!("connection refused: {addr}"))
        }
        _ => Error::Io(e),
    }
}

/// Map a data-path I/O error to the appropriate [`Error`] variant.
fn map_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::ConnectionAborted => Error::ConnectionClosed,
        _ => Error::Io(e),
    }
}
