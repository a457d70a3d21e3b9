use crate::env::Environment;
use crate::error::Result;
use crate::registry::Registry;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

/// Keyword arguments passed to a command.
///
/// The grammar never produces any, so commands always receive an empty map.
pub type Kwargs = HashMap<String, String>;

/// Successful outcome of a single statement.
///
/// The pipeline never looks inside; it is handed back to the caller as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text produced by the command (logged content, new folder, help table).
    Text(String),
    /// Paths collected by a listing command.
    Paths(Vec<PathBuf>),
    /// A plain flag, e.g. `exit` reports `true`.
    Bool(bool),
}

/// Everything a command may touch while it runs.
pub struct Context<'a> {
    /// Process-level state: current folder, running flag, debug flag.
    pub env: &'a mut Environment,
    /// The table of installed commands, for commands that document the others.
    pub registry: &'a Registry,
    /// Where console output goes.
    pub stdout: &'a mut dyn Write,
}

impl<'a> Context<'a> {
    pub fn new(env: &'a mut Environment, registry: &'a Registry, stdout: &'a mut dyn Write) -> Self {
        Self {
            env,
            registry,
            stdout,
        }
    }

    /// Write to the console. A broken console is not a line-level error, so
    /// write failures are dropped here.
    pub fn print(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.stdout.write_fmt(args);
    }
}

/// Object-safe trait for anything that can run as a command body.
pub trait ExecutableCommand {
    /// Runs the command with positional `args` (already unquoted) and `kwargs`.
    ///
    /// Argument count and shape are the command's own business; the
    /// interpreter passes whatever the user typed.
    fn execute(&self, args: &[String], kwargs: &Kwargs, ctx: &mut Context<'_>) -> Result<Value>;
}

struct FnCommand<F>(F);

impl<F> ExecutableCommand for FnCommand<F>
where
    F: Fn(&[String], &Kwargs, &mut Context<'_>) -> Result<Value>,
{
    fn execute(&self, args: &[String], kwargs: &Kwargs, ctx: &mut Context<'_>) -> Result<Value> {
        (self.0)(args, kwargs, ctx)
    }
}

/// A command as the registry knows it: names, documentation and body.
pub struct CommandDescriptor {
    name: String,
    spellings: Vec<String>,
    description: String,
    usage: String,
    handler: Box<dyn ExecutableCommand>,
}

impl CommandDescriptor {
    /// Create a descriptor.
    ///
    /// `name` is the internal tag (upper case by convention, e.g. `LOG`), used
    /// as the token category and AST identifier. `spellings` lists every way a
    /// user may type the verb; the first one is the canonical spelling. Put
    /// longer spellings before shorter ones that share a prefix.
    ///
    /// The usage example starts out as the canonical spelling; override it
    /// with [`CommandDescriptor::with_usage`].
    pub fn new(
        name: impl Into<String>,
        spellings: &[&str],
        handler: impl ExecutableCommand + 'static,
    ) -> Self {
        let spellings: Vec<String> = spellings.iter().map(|s| s.to_string()).collect();
        Self {
            name: name.into(),
            usage: spellings.first().cloned().unwrap_or_default(),
            spellings,
            description: String::new(),
            handler: Box::new(handler),
        }
    }

    /// Same as [`CommandDescriptor::new`] with a closure as the body.
    pub fn from_fn<F>(name: impl Into<String>, spellings: &[&str], body: F) -> Self
    where
        F: Fn(&[String], &Kwargs, &mut Context<'_>) -> Result<Value> + 'static,
    {
        Self::new(name, spellings, FnCommand(body))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spellings(&self) -> &[String] {
        &self.spellings
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// `canonical (or alt1, alt2, ...)`, or just `canonical` when there is one spelling.
    pub fn friendly_name(&self) -> String {
        match self.spellings.split_first() {
            None => String::new(),
            Some((first, [])) => first.clone(),
            Some((first, rest)) => format!("{} (or {})", first, rest.join(", ")),
        }
    }

    /// Regex alternating every spelling between word boundaries.
    ///
    /// Spellings are escaped, so they always match literally. Alternatives are
    /// tried left to right.
    pub fn match_pattern(&self) -> String {
        let alternatives: Vec<String> = self.spellings.iter().map(|s| regex::escape(s)).collect();
        format!(r"\b(?:{})\b", alternatives.join("|"))
    }

    pub fn execute(&self, args: &[String], kwargs: &Kwargs, ctx: &mut Context<'_>) -> Result<Value> {
        self.handler.execute(args, kwargs, ctx)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("spellings", &self.spellings)
            .finish_non_exhaustive()
    }
}
