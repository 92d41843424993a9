//! Shared types for the Tiller command dispatch engine.
//!
//! This crate holds the pieces that cross the boundary between a transport
//! (the thing that receives raw message text) and the command engine in
//! `tiller-commands`:
//!
//! - [`CommandContext`] -- who sent the message, over which channel, and the
//!   opaque cancellation signal passed through to handlers.
//! - [`CommandError`] -- the runtime failure taxonomy surfaced through error
//!   events and dispatch results.
//! - [`BuildError`] -- fatal registration-time failures.
//! - [`RunMode`] -- the execution-concurrency contract for a command.

pub mod context;
pub mod error;
pub mod run_mode;

pub use context::CommandContext;
pub use error::{BuildError, CommandError};
pub use run_mode::RunMode;
