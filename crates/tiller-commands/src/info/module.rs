//! Descriptor for a module: a named grouping of commands sharing a prefix.

use std::sync::Arc;

use crate::info::CommandInfo;
use crate::precondition::Precondition;

/// Immutable metadata for one registered module.
///
/// Modules are constructed once from registration records and never mutated;
/// unloading removes the whole subtree from the service under its write lock.
/// Nesting is a parent-linked tree in one direction only (parents are
/// identified by path, not by back-pointers), so cycles cannot form.
pub struct ModuleInfo {
    prefix: String,
    path: String,
    summary: Option<String>,
    preconditions: Vec<Arc<dyn Precondition>>,
    commands: Vec<Arc<CommandInfo>>,
    submodules: Vec<Arc<ModuleInfo>>,
}

impl ModuleInfo {
    pub(crate) fn new(
        prefix: String,
        path: String,
        summary: Option<String>,
        preconditions: Vec<Arc<dyn Precondition>>,
        commands: Vec<Arc<CommandInfo>>,
        submodules: Vec<Arc<ModuleInfo>>,
    ) -> Self {
        Self {
            prefix,
            path,
            summary,
            preconditions,
            commands,
            submodules,
        }
    }

    /// The module's own prefix segment (may be empty for a root grouping).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Canonical path: ancestor prefixes joined with the separator.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Preconditions inherited by every command in this module and below.
    pub fn preconditions(&self) -> &[Arc<dyn Precondition>] {
        &self.preconditions
    }

    /// Commands declared directly in this module.
    pub fn commands(&self) -> &[Arc<CommandInfo>] {
        &self.commands
    }

    pub fn submodules(&self) -> &[Arc<ModuleInfo>] {
        &self.submodules
    }

    /// All commands in this module and its submodules, depth-first.
    pub fn all_commands(&self) -> Vec<Arc<CommandInfo>> {
        let mut out: Vec<Arc<CommandInfo>> = self.commands.clone();
        for sub in &self.submodules {
            out.extend(sub.all_commands());
        }
        out
    }
}

impl std::fmt::Debug for ModuleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleInfo")
            .field("path", &self.path)
            .field("commands", &self.commands.len())
            .field("submodules", &self.submodules.len())
            .finish()
    }
}
