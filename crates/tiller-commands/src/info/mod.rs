//! Immutable descriptors built once at registration time.
//!
//! - [`parameter`]: [`ParameterInfo`] -- one declared parameter with its
//!   resolved reader.
//! - [`command`]: [`CommandInfo`] -- aliases, parameters, aggregated
//!   preconditions, run mode, priority, and the handler reference.
//! - [`module`]: [`ModuleInfo`] -- a named, possibly nested grouping of
//!   commands sharing a prefix and inherited preconditions.

pub mod command;
pub mod module;
pub mod parameter;

pub use command::CommandInfo;
pub use module::ModuleInfo;
pub use parameter::ParameterInfo;
