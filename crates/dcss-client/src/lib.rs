//! dcss-client: Client for the DCSS instrument-control bus.
//!
//! The bus coordinates peers (GUIs, hardware services, automation scripts)
//! around a shared instrument-control session over a line-oriented text
//! protocol. A peer logs in, optionally contends for exclusive master
//! write privilege, issues long-running named operations and string-valued
//! configuration updates, and observes a continuous stream of asynchronous
//! notifications describing device and session state.
//!
//! # Layers
//!
//! - [`engine::FrameEngine`] -- owns the line stream; blocking read and
//!   variant-selected send.
//! - [`client::DcssClient`] -- login, master arbitration, readiness, and
//!   operation/string correlation, with a per-frame dispatch hook
//!   ([`client::FrameObserver`]).
//! - [`handle::OperationHandle`] -- progress and completion reporting for
//!   operations the bus delegates to this peer.
//! - [`codec`] -- pure decoders for the fixed-grammar diagnostic payloads.
//! - [`runs`] -- the run-configuration registry and its convenience client.
//!
//! # Concurrency model
//!
//! One logical connection, one pumping task: every public operation is
//! awaited by the caller, and the awaiting task is the one that reads and
//! dispatches frames. There is no background reader, no internal timeout,
//! and no locking -- callers wanting bounded waits must cancel the pending
//! future externally and accept that the read position does not rewind.

pub mod client;
pub mod codec;
pub mod engine;
pub mod handle;
pub mod runs;

pub use client::{ClientOptions, DcssClient, FrameObserver, Frames, NullObserver, Session};
pub use engine::FrameEngine;
pub use handle::OperationHandle;
pub use runs::{RunRecord, RunRegistry, Runs, RUN_FIELDS, RUN_SLOTS};
