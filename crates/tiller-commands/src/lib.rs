//! Text-command registration and dispatch for chat transports.
//!
//! Modules declare their commands through record builders; the service
//! compiles the records into immutable descriptors, indexes every alias in
//! a prefix trie, and dispatches incoming messages through prefix
//! detection, longest-alias search, typed argument parsing, precondition
//! gating, and handler execution.
//!
//! ## Quick Start
//!
//! ```
//! use tiller_commands::{
//!     handler, CommandContext, CommandService, CommandSpec, ModuleSpec, ParameterSpec,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = CommandService::default();
//! service
//!     .register_module(
//!         ModuleSpec::new("math").command(
//!             CommandSpec::new("add", handler(|_ctx, args| async move {
//!                 let a: i64 = *args.get(0)?;
//!                 let b: i64 = *args.get(1)?;
//!                 println!("{}", a + b);
//!                 Ok(())
//!             }))
//!             .param(ParameterSpec::of::<i64>("a"))
//!             .param(ParameterSpec::of::<i64>("b")),
//!         ),
//!     )
//!     .expect("register");
//!
//! let ctx = CommandContext::new("user", "general", "/math add 2 3");
//! service.handle_message(&ctx).await;
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`builder`]: registration records and descriptor compilation
//! - [`config`]: dispatch configuration (prefixes, quotes, run-mode default)
//! - [`events`]: lifecycle event subscription (`executed` / `errored`)
//! - [`handler`]: the async handler trait commands dispatch to
//! - [`info`]: immutable command, module, and parameter descriptors
//! - [`map`]: prefix trie indexing every alias for longest-match search
//! - [`precondition`]: ordered gate chain evaluated before execution
//! - [`reader`]: type reader registry with module-scoped overrides
//! - [`service`]: the registry and dispatcher itself
//! - [`value`]: type-erased argument values and the `Args` container

pub mod builder;
pub mod config;
pub mod events;
pub mod handler;
pub mod info;
pub mod map;
mod parser;
pub mod precondition;
pub mod reader;
pub mod service;
pub mod value;

pub use builder::{CommandSpec, ModuleSpec, ParameterSpec};
pub use config::{CommandConfig, MultiMatchHandling};
pub use events::CommandEvents;
pub use handler::{handler, CommandHandler};
pub use info::{CommandInfo, ModuleInfo, ParameterInfo};
pub use map::CommandMap;
pub use precondition::{precondition, Precondition};
pub use reader::{enum_reader, EnumArg, ReaderValue, TypeReader, TypeReaderRegistry};
pub use service::CommandService;
pub use value::{ArgValue, Args, TypeTag};

pub use tiller_types::{BuildError, CommandContext, CommandError, RunMode};
