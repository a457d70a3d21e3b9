//! Jobs: an interactive shell for a tiny English-like command language.
//!
//! A line such as `move to "src"` or `log "hi" with "there"` goes through a
//! one-shot pipeline: the [`lexer`] splits it into tokens using rules derived
//! from the installed commands, the [`parser`] builds one statement from them,
//! and [`interpreter::interpret`] hands the statement's arguments to the
//! matching command from the [`Registry`].
//!
//! The main entry point is [`Interpreter`], which owns the command table and
//! the [`env::Environment`] the commands work on. New verbs are plugged in by
//! registering a [`command::CommandDescriptor`]; nothing else in the pipeline
//! needs to change.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod registry;

pub use error::{JobsError, RegistryError, Result};
pub use interpreter::Interpreter;
pub use registry::Registry;
