//! The identifier -> command table.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use commander_core::{Command, CommandDescription, RegisteredCommand};
use tracing::debug;

/// Built once during single-threaded startup and read-only afterwards, so
/// lookups need no synchronization once the daemon is serving.
#[derive(Default)]
pub struct Registry {
    commands: HashMap<String, Arc<dyn RegisteredCommand>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the command's `init` and inserts it. A command is never reachable
    /// before its init completed; an init error aborts startup.
    ///
    /// Re-installing an identifier overwrites the previous entry — last
    /// registration wins.
    pub async fn install<C: Command>(&mut self, mut command: C) -> Result<()> {
        let identifier = Command::identifier(&command).to_string();
        command
            .init()
            .await
            .with_context(|| format!("initialising command '{identifier}'"))?;
        debug!(command = %identifier, "registered command");
        self.commands.insert(identifier, Arc::new(command));
        Ok(())
    }

    pub fn lookup(&self, identifier: &str) -> Option<Arc<dyn RegisteredCommand>> {
        self.commands.get(identifier).cloned()
    }

    /// Iterates the registered commands in unspecified order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn RegisteredCommand>> {
        self.commands.values()
    }

    pub fn descriptions(&self) -> Vec<CommandDescription> {
        self.all().map(|command| command.describe()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
