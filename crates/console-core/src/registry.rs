//! # Command Registry
//!
//! Ordered collection of [`Command`]s, unique by identity. Registering a
//! command that is already present replaces it in its original slot, so
//! hosts can re-run discovery without duplicating entries.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::command::Command;
use crate::errors::Result;
use crate::fuzzy;
use crate::handler::{FnInvocable, Handler, Method};
use crate::invocable::{Invocable, NoTargetLabels, Receiver, TargetLabelResolver};

/// What discovery found for one operation
#[derive(Clone)]
pub struct Registration {
    /// The operation
    pub invocable: Arc<dyn Invocable>,
    /// Bound instance, if any
    pub receiver: Option<Receiver>,
    /// Display name override
    pub name: Option<String>,
    /// Group tag
    pub group: Option<String>,
    /// Description, replaces the full name when present
    pub description: Option<String>,
}

impl Registration {
    /// Register `invocable` under its declared name
    pub fn new(invocable: Arc<dyn Invocable>) -> Self {
        Self {
            invocable,
            receiver: None,
            name: None,
            group: None,
            description: None,
        }
    }

    /// Bind to an instance
    pub fn with_receiver(mut self, receiver: Receiver) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("signature", self.invocable.signature())
            .field("receiver", &self.receiver)
            .field("name", &self.name)
            .field("group", &self.group)
            .field("description", &self.description)
            .finish()
    }
}

/// Result of [`CommandRegistry::register`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Appended as a new entry
    Inserted,
    /// Replaced the entry at this index
    Replaced(usize),
}

/// Registry of live commands
#[derive(Clone)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    resolver: Arc<dyn TargetLabelResolver>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Empty registry that labels no targets
    pub fn new() -> Self {
        Self::with_resolver(NoTargetLabels)
    }

    /// Empty registry resolving target labels through `resolver`
    pub fn with_resolver(resolver: impl TargetLabelResolver + 'static) -> Self {
        Self {
            commands: Vec::new(),
            resolver: Arc::new(resolver),
        }
    }

    /// Empty registry sharing this one's resolver
    pub fn empty_like(&self) -> Self {
        Self {
            commands: Vec::new(),
            resolver: Arc::clone(&self.resolver),
        }
    }

    /// Insert `command`, or replace the entry with the same identity in place
    pub fn register(&mut self, command: Command) -> RegisterOutcome {
        match self.commands.iter().position(|c| c == &command) {
            Some(index) => {
                tracing::debug!(
                    command = %command.name(),
                    index,
                    "Replacing registered command"
                );
                self.commands[index] = command;
                RegisterOutcome::Replaced(index)
            }
            None => {
                tracing::debug!(command = %command.name(), "Registering command");
                self.commands.push(command);
                RegisterOutcome::Inserted
            }
        }
    }

    /// Build a command from a discovery tuple and register it.
    ///
    /// # Errors
    ///
    /// Returns the construction error when the operation declares an
    /// unsupported parameter; nothing is registered.
    pub fn register_declared(&mut self, registration: Registration) -> Result<RegisterOutcome> {
        let Registration {
            invocable,
            receiver,
            name,
            group,
            description,
        } = registration;

        let mut command = Command::new(invocable, receiver)
            .map_err(|e| {
                tracing::warn!(error = %e, "Skipping command registration");
                e
            })?
            .with_target_label(self.resolver.as_ref());

        if let Some(name) = name {
            command.set_name(name);
        }
        if let Some(group) = group {
            command = command.with_group(group);
        }
        if let Some(description) = description {
            command = command.with_full_name(description);
        }

        Ok(self.register(command))
    }

    /// Register a static handler under `name`
    ///
    /// # Errors
    ///
    /// See [`register_declared`](Self::register_declared).
    pub fn register_fn<H, Args>(
        &mut self,
        name: impl Into<String>,
        handler: H,
    ) -> Result<RegisterOutcome>
    where
        H: Handler<Args>,
        Args: 'static,
    {
        let invocable = FnInvocable::function(name, handler);
        self.register_declared(Registration::new(Arc::new(invocable)))
    }

    /// Register a handler bound to `receiver` under `name`
    ///
    /// # Errors
    ///
    /// See [`register_declared`](Self::register_declared).
    pub fn register_method<T, H, Args>(
        &mut self,
        name: impl Into<String>,
        receiver: Arc<T>,
        handler: H,
    ) -> Result<RegisterOutcome>
    where
        T: Any + Send + Sync,
        H: Method<T, Args>,
        Args: 'static,
    {
        let invocable = FnInvocable::method::<T, H, Args>(name, handler);
        self.register_declared(
            Registration::new(Arc::new(invocable)).with_receiver(Receiver::new(receiver)),
        )
    }

    /// Remove every command named `name`, ignoring case. Returns the count.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.commands.len();
        self.commands.retain(|c| !fuzzy::eq_fold(c.name(), name));
        let removed = before - self.commands.len();

        if removed == 0 {
            tracing::warn!(command = %name, "Command not found");
        } else {
            tracing::info!(command = %name, removed, "Command removed");
        }
        removed
    }

    /// First command named `name`, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&Command> {
        self.commands
            .iter()
            .find(|c| fuzzy::eq_fold(c.name(), name))
    }

    /// All commands in registration order
    pub fn all(&self) -> &[Command] {
        &self.commands
    }

    /// Display names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(Command::name).collect()
    }

    /// Iterate in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish_non_exhaustive()
    }
}
