//! Bus-delegated operation handles.
//!
//! When the bus instructs this peer to perform work it sends a
//! `..._start_operation` frame carrying an opaque dotted handle. The peer
//! reports progress with `htos_operation_update` frames and finishes the
//! operation exactly once, with either a normal or an error completion.
//! [`OperationHandle`] tracks that terminal transition: reporting on a
//! handle that has already completed fails with [`Error::StaleHandle`].

use std::fmt;

use dcss_core::{Error, Result, Transport};

use crate::client::{DcssClient, FrameObserver};

/// One operation the bus delegated to this peer.
///
/// Identified by `(name, handle)`: two handles refer to the same logical
/// operation iff both fields match. Borrows the client mutably for its
/// lifetime -- reports go out on the session's single outgoing stream.
pub struct OperationHandle<'c, T: Transport, O: FrameObserver> {
    client: &'c mut DcssClient<T, O>,
    name: String,
    handle: String,
    terminal: bool,
}

impl<T: Transport, O: FrameObserver> DcssClient<T, O> {
    /// Build a reporting handle for a delegated operation, typically from
    /// a decoded `..._start_operation` frame.
    pub fn delegated(
        &mut self,
        name: impl Into<String>,
        handle: impl Into<String>,
    ) -> OperationHandle<'_, T, O> {
        OperationHandle {
            client: self,
            name: name.into(),
            handle: handle.into(),
            terminal: false,
        }
    }
}

impl<T: Transport, O: FrameObserver> OperationHandle<'_, T, O> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Whether this operation has already been completed or errored.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn guard(&self) -> Result<()> {
        if self.terminal {
            Err(Error::StaleHandle)
        } else {
            Ok(())
        }
    }

    fn report_line(&self, verb: &str, status: Option<&str>, args: &[&str]) -> String {
        let mut line = format!("htos_operation_{verb} {} {}", self.name, self.handle);
        if let Some(status) = status {
            line.push(' ');
            line.push_str(status);
        }
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Report progress. May be called any number of times before the
    /// operation reaches a terminal state.
    pub async fn update(&mut self, args: &[&str]) -> Result<()> {
        self.guard()?;
        let line = self.report_line("update", None, args);
        self.client.send_command(&line).await
    }

    /// Report normal completion. Marks the handle terminal.
    pub async fn completed(&mut self, args: &[&str]) -> Result<()> {
        self.guard()?;
        let line = self.report_line("completed", Some("normal"), args);
        self.client.send_command(&line).await?;
        self.terminal = true;
        Ok(())
    }

    /// Report failure. Marks the handle terminal.
    pub async fn error(&mut self, args: &[&str]) -> Result<()> {
        self.guard()?;
        let line = self.report_line("completed", Some("error"), args);
        self.client.send_command(&line).await?;
        self.terminal = true;
        Ok(())
    }
}

impl<T: Transport, O: FrameObserver> PartialEq for OperationHandle<'_, T, O> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.handle == other.handle
    }
}

impl<T: Transport, O: FrameObserver> fmt::Debug for OperationHandle<'_, T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationHandle")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .field("terminal", &self.terminal)
            .finish()
    }
}

impl<T: Transport, O: FrameObserver> fmt::Display for OperationHandle<'_, T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.handle)
    }
}
