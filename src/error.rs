//! Error types shared by the lexer, the parser and every installed command.
//!
//! [`JobsError`] is the closed set of line-level failures: it is reported to the
//! user and the shell carries on with the next line. [`RegistryError`] covers
//! mistakes in the command table itself and is only produced while the shell
//! starts up.

use std::io::{self, Write};

/// A recoverable, line-level error.
///
/// Each variant carries a human readable message. The kind name (see
/// [`JobsError::name`]) is what the REPL prints in front of it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobsError {
    /// Malformed input: an unknown command, an unexpected token, missing content
    /// or a missing `with`.
    #[error("Incorrect syntax: {0}")]
    Syntax(String),

    /// A command received the wrong number or shape of arguments.
    #[error("Arguments' error: {0}")]
    Arguments(String),

    /// The environment refused an operation (missing folder, no permission).
    #[error("Security error: {0}")]
    Security(String),
}

impl JobsError {
    pub fn syntax(msg: impl Into<String>) -> Self {
        JobsError::Syntax(msg.into())
    }

    pub fn arguments(msg: impl Into<String>) -> Self {
        JobsError::Arguments(msg.into())
    }

    pub fn security(msg: impl Into<String>) -> Self {
        JobsError::Security(msg.into())
    }

    /// Human readable name of the error kind.
    pub fn name(&self) -> &'static str {
        match self {
            JobsError::Syntax(_) => "Incorrect syntax",
            JobsError::Arguments(_) => "Arguments' error",
            JobsError::Security(_) => "Security error",
        }
    }

    /// The message without the kind name.
    pub fn message(&self) -> &str {
        match self {
            JobsError::Syntax(msg) | JobsError::Arguments(msg) | JobsError::Security(msg) => msg,
        }
    }

    /// Render the error the way the REPL shows it: surrounded by blank lines,
    /// with the kind name highlighted in red.
    pub fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "\n\x1b[31m{}\x1b[0m: {}\n\n", self.name(), self.message())
    }
}

/// Convenience alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, JobsError>;

/// A mistake in the command table. Fatal: the shell refuses to start.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("command {0} is registered more than once")]
    DuplicateName(String),

    #[error("command {0} has no spellings")]
    NoSpellings(String),

    #[error("command {0} has an empty spelling")]
    BlankSpelling(String),

    #[error("command {0} has no usage example")]
    MissingUsage(String),

    #[error("command {name} has an invalid match pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}
