//! dcss-transport: TCP transport for the DCSS control-bus client.
//!
//! Provides [`TcpTransport`], an implementation of
//! [`dcss_core::Transport`] over a TCP socket, including the byte layout
//! of the two outgoing framing variants.

pub mod tcp;

pub use tcp::TcpTransport;
