//! dcss-core: Core types, traits, and error definitions for the DCSS
//! control-bus client.
//!
//! This crate defines the protocol-agnostic abstractions shared by the
//! client, transport, and test-harness crates. Applications normally depend
//! on `dcss-client` and only reach into this crate for the [`Transport`]
//! trait when supplying their own byte stream.
//!
//! # Key types
//!
//! - [`Frame`] -- one decoded protocol line
//! - [`Transport`] -- line-level communication channel to the bus
//! - [`FrameVariant`] -- which outgoing framing a line is written with
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod frame;
pub mod transport;

// Re-export key types at crate root for ergonomic `use dcss_core::*`.
pub use error::{Error, Result};
pub use frame::{Direction, Frame, FrameVariant};
pub use transport::Transport;
