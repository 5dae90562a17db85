//! Command registry: the fixed mapping from command names to handlers.
//!
//! A registry is assembled once at startup through [`CommandRegistryBuilder`]
//! and is read-only afterwards. Names are matched exactly and each name maps
//! to exactly one handler.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::handlers::OperationHandler;

mod tables;

pub use self::tables::command_table;

/// Errors raised while assembling a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The same name was registered twice.
    #[error("command '{command}' is already registered")]
    DuplicateCommand {
        /// The repeated name.
        command: String,
    },
}

/// Read-only mapping from command name to handler.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn OperationHandler>>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands())
            .finish()
    }
}

impl CommandRegistry {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> CommandRegistryBuilder {
        CommandRegistryBuilder::default()
    }

    /// Looks up the handler registered under `command`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownCommand`] when no handler matches.
    pub fn resolve(&self, command: &str) -> Result<Arc<dyn OperationHandler>, DispatchError> {
        self.handlers
            .get(command)
            .cloned()
            .ok_or_else(|| DispatchError::unknown_command(command))
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Collects registrations before freezing them into a [`CommandRegistry`].
#[derive(Default)]
pub struct CommandRegistryBuilder {
    handlers: HashMap<String, Arc<dyn OperationHandler>>,
}

impl fmt::Debug for CommandRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CommandRegistryBuilder")
            .field("commands", &names)
            .finish()
    }
}

impl CommandRegistryBuilder {
    /// Registers `handler` under `command`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`] if the name is taken.
    pub fn register<H>(mut self, command: &str, handler: H) -> Result<Self, RegistryError>
    where
        H: OperationHandler + 'static,
    {
        if self.handlers.contains_key(command) {
            return Err(RegistryError::DuplicateCommand {
                command: command.to_owned(),
            });
        }
        self.handlers.insert(command.to_owned(), Arc::new(handler));
        Ok(self)
    }

    /// Freezes the registrations.
    #[must_use]
    pub fn build(self) -> CommandRegistry {
        CommandRegistry {
            handlers: self.handlers,
        }
    }
}
