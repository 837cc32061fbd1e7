//! Mock bus transport for deterministic testing of the protocol layers.
//!
//! [`MockBus`] implements [`Transport`] over two in-memory queues: a script
//! of incoming lines and a log of outgoing `(variant, line)` pairs. Unlike
//! a request/response mock, the script is pre-loaded in arrival order --
//! the bus pushes unsolicited notifications interleaved with replies, and
//! the client pumps frames from a single task, so a pre-queued stream
//! reproduces any interleaving exactly.
//!
//! When the script runs dry the transport reports end-of-stream, which the
//! engine surfaces as `ConnectionClosed`.
//!
//! # Example
//!
//! ```
//! use dcss_test_harness::MockBus;
//!
//! let mut bus = MockBus::new();
//! bus.push_line("stog_other_master");
//! bus.push_line("stog_operation_completed robot_config 17.0 normal");
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;
use dcss_core::{FrameVariant, Result, Transport};

/// A scripted in-memory [`Transport`] for tests.
#[derive(Debug, Default)]
pub struct MockBus {
    /// Incoming lines, consumed in order by `next_line`.
    incoming: VecDeque<String>,
    /// Log of every line sent through this transport, with its variant.
    sent: Vec<(FrameVariant, String)>,
}

impl MockBus {
    /// Create an empty mock bus. With no script loaded, the first read
    /// reports end-of-stream.
    pub fn new() -> Self {
        MockBus::default()
    }

    /// Queue one incoming line.
    pub fn push_line(&mut self, line: &str) {
        self.incoming.push_back(line.to_string());
    }

    /// Queue several incoming lines in order.
    pub fn push_lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        for line in lines {
            self.push_line(line);
        }
    }

    /// Every line sent so far, in order, with the variant it was framed as.
    pub fn sent_lines(&self) -> &[(FrameVariant, String)] {
        &self.sent
    }

    /// The text of every line sent so far, in order.
    pub fn sent_texts(&self) -> Vec<&str> {
        self.sent.iter().map(|(_, line)| line.as_str()).collect()
    }

    /// Number of scripted lines not yet consumed.
    pub fn remaining_lines(&self) -> usize {
        self.incoming.len()
    }
}

#[async_trait]
impl Transport for MockBus {
    async fn send_line(&mut self, variant: FrameVariant, line: &str) -> Result<()> {
        self.sent.push((variant, line.to_string()));
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.incoming.pop_front())
    }
}
