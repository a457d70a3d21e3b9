//! The table of installed commands.
//!
//! A [`Registry`] is filled once while the shell starts and is only read
//! afterwards: the lexer takes its match patterns from it, the parser and the
//! interpreter look commands up by their internal tag.

use crate::command::CommandDescriptor;
use crate::error::RegistryError;
use regex::Regex;

#[derive(Debug, Default)]
pub struct Registry {
    commands: Vec<CommandDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of descriptors, in order.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = CommandDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// A registry holding every built-in command.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let registry = Self::from_descriptors(crate::builtin::descriptors())?;
        log::info!("registered {} commands", registry.commands.len());
        Ok(registry)
    }

    /// Add a command.
    ///
    /// Fails when the internal name is already taken, when there is no spelling,
    /// when a spelling is blank, when the usage example is empty, or when the
    /// spellings do not form a valid pattern.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        if self.lookup(descriptor.name()).is_some() {
            return Err(RegistryError::DuplicateName(descriptor.name().to_string()));
        }
        if descriptor.spellings().is_empty() {
            return Err(RegistryError::NoSpellings(descriptor.name().to_string()));
        }
        // A blank alternative matches nothing and shadows every later spelling.
        if descriptor.spellings().iter().any(|s| s.trim().is_empty()) {
            return Err(RegistryError::BlankSpelling(descriptor.name().to_string()));
        }
        if descriptor.usage().trim().is_empty() {
            return Err(RegistryError::MissingUsage(descriptor.name().to_string()));
        }
        Regex::new(&descriptor.match_pattern()).map_err(|source| RegistryError::InvalidPattern {
            name: descriptor.name().to_string(),
            source,
        })?;

        log::debug!("registering {}", descriptor.friendly_name());
        self.commands.push(descriptor);
        Ok(())
    }

    /// Exact, case-sensitive lookup by internal name.
    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.name() == name)
    }

    /// Every command, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
