//! dcss-test-harness: Scripted mock transports for deterministic protocol
//! tests.
//!
//! This crate provides [`MockBus`], an in-memory [`Transport`]
//! (see [`dcss_core::Transport`]) pre-loaded with the lines the bus will
//! push, enabling unit tests of the session, correlation, and registry
//! layers without a socket.

pub mod mock_bus;

pub use mock_bus::MockBus;
