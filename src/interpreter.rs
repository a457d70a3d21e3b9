use crate::command::{Context, Kwargs, Value};
use crate::env::Environment;
use crate::error::{JobsError, RegistryError, Result};
use crate::lexer::{Lexer, Token};
use crate::parser::{self, AstNode};
use crate::registry::Registry;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

/// Run one parsed statement.
///
/// Resolves the statement's tag in the registry, collects the argument leaves
/// in order and hands them to the command together with an empty keyword map.
/// Whatever the command returns is passed through untouched.
pub fn interpret(statement: &AstNode, ctx: &mut Context<'_>) -> Result<Value> {
    let registry = ctx.registry;
    let name = statement.tag();
    let command = registry
        .lookup(name)
        .ok_or_else(|| JobsError::syntax(format!("command {name} not found")))?;

    let args: Vec<String> = statement
        .children()
        .iter()
        .filter_map(|child| child.value())
        .map(str::to_string)
        .collect();

    command.execute(&args, &Kwargs::new(), ctx)
}

/// The Jobs shell: a fixed set of commands plus the state they work on.
///
/// Every input line goes through the same one-shot pipeline, see
/// [`Interpreter::run`]. The command table never changes once the interpreter
/// exists.
///
/// Example
/// ```
/// use jobs::Interpreter;
/// let mut sh = Interpreter::with_builtins().unwrap();
/// let mut out = Vec::new();
/// let results = sh.run(r#"log "hello" with " world""#, &mut out).unwrap();
/// assert_eq!(results.len(), 1);
/// ```
pub struct Interpreter {
    env: Environment,
    registry: Registry,
    lexer: Lexer,
}

impl Interpreter {
    /// Create an interpreter over `registry`, working in the process's current folder.
    pub fn new(registry: Registry) -> std::result::Result<Self, RegistryError> {
        Self::with_env(registry, Environment::new())
    }

    /// Create an interpreter over `registry` with an explicit environment.
    pub fn with_env(
        registry: Registry,
        env: Environment,
    ) -> std::result::Result<Self, RegistryError> {
        let lexer = Lexer::new(&registry)?;
        Ok(Self {
            env,
            registry,
            lexer,
        })
    }

    /// An interpreter with every built-in command installed.
    pub fn with_builtins() -> std::result::Result<Self, RegistryError> {
        Self::new(Registry::with_builtins()?)
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Threads one line through tokenizer, parser and interpreter.
    ///
    /// Statements run in order and the first failing one stops the line; its
    /// error is returned unchanged. Console output of commands goes to `stdout`.
    pub fn run(&mut self, line: &str, stdout: &mut dyn Write) -> Result<Vec<Value>> {
        let result = self.run_inner(line, stdout);
        if let Err(e) = &result {
            log::warn!("{line:?} failed: {e}");
        }
        result
    }

    fn run_inner(&mut self, line: &str, stdout: &mut dyn Write) -> Result<Vec<Value>> {
        let tokens = self.lexer.tokenize(line)?;
        log::debug!("tokens = {tokens:?}");
        if self.env.debug {
            let _ = write_tokens(&tokens, stdout);
        }

        let statements = parser::construct_ast(tokens, &self.registry)?;
        log::debug!("ast = {statements:?}");
        if self.env.debug {
            let _ = write_ast(&statements, stdout);
        }

        let mut ctx = Context::new(&mut self.env, &self.registry, stdout);
        statements
            .iter()
            .map(|statement| interpret(statement, &mut ctx))
            .collect()
    }

    /// Read-Eval-Print Loop over the terminal.
    ///
    /// Runs until a command clears the running flag or the user hits Ctrl-C /
    /// Ctrl-D. Blank lines are ignored.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;
        let mut stdout = std::io::stdout();

        while !self.env.should_exit {
            match rl.readline(&self.env.prompt()) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    if let Err(e) = self.run(&line, &mut stdout) {
                        e.write_to(&mut stdout)?;
                    }
                    stdout.flush()?;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("Eof");
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

fn write_tokens(tokens: &[Token], out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "Tokens")?;
    writeln!(out, "Type: Value")?;
    for token in tokens {
        writeln!(out, "{token}")?;
    }
    writeln!(out)
}

fn write_ast(statements: &[AstNode], out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "AST:")?;
    for statement in statements {
        writeln!(out, "{statement}")?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandDescriptor;
    use std::cell::Cell;
    use std::rc::Rc;

    fn echo_registry() -> Registry {
        Registry::from_descriptors([
            CommandDescriptor::from_fn("ECHO", &["echo"], |args, kwargs, _| {
                assert!(kwargs.is_empty());
                Ok(Value::Text(args.join("|")))
            }),
            CommandDescriptor::from_fn("FAIL", &["fail"], |_, _, _| {
                Err(JobsError::arguments("always fails"))
            }),
        ])
        .unwrap()
    }

    #[test]
    fn test_interpret_passes_arguments_in_order() {
        let registry = echo_registry();
        let mut env = Environment::at(".");
        let mut out = Vec::new();
        let mut ctx = Context::new(&mut env, &registry, &mut out);

        let statement = AstNode::Command {
            name: "ECHO".to_string(),
            arguments: vec![
                AstNode::Content("a".to_string()),
                AstNode::Content("b c".to_string()),
            ],
        };

        assert_eq!(
            interpret(&statement, &mut ctx).unwrap(),
            Value::Text("a|b c".to_string())
        );
    }

    #[test]
    fn test_interpret_unknown_tag_is_not_found() {
        let registry = echo_registry();
        let mut env = Environment::at(".");
        let mut out = Vec::new();
        let mut ctx = Context::new(&mut env, &registry, &mut out);

        let statement = AstNode::Command {
            name: "NOPE".to_string(),
            arguments: vec![],
        };
        assert_eq!(
            interpret(&statement, &mut ctx).unwrap_err(),
            JobsError::syntax("command NOPE not found")
        );
    }

    #[test]
    fn test_interpret_returns_command_error_unchanged() {
        let registry = echo_registry();
        let mut env = Environment::at(".");
        let mut out = Vec::new();
        let mut ctx = Context::new(&mut env, &registry, &mut out);

        let statement = AstNode::Command {
            name: "FAIL".to_string(),
            arguments: vec![],
        };
        assert_eq!(
            interpret(&statement, &mut ctx).unwrap_err(),
            JobsError::arguments("always fails")
        );
    }

    #[test]
    fn test_run_full_pipeline() {
        let mut sh = Interpreter::with_env(echo_registry(), Environment::at(".")).unwrap();
        let mut out = Vec::new();

        let results = sh.run(r#"echo "a" with b with "c d""#, &mut out).unwrap();
        assert_eq!(results, vec![Value::Text("a|b|c d".to_string())]);
    }

    #[test]
    fn test_run_empty_line_is_unknown_command() {
        let mut sh = Interpreter::with_env(echo_registry(), Environment::at(".")).unwrap();
        let mut out = Vec::new();
        assert_eq!(
            sh.run("", &mut out).unwrap_err(),
            JobsError::syntax("unknown command")
        );
    }

    #[test]
    fn test_run_does_not_execute_on_syntax_error() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let registry = Registry::from_descriptors([CommandDescriptor::from_fn(
            "COUNT",
            &["count"],
            move |_, _, _| {
                counter.set(counter.get() + 1);
                Ok(Value::Bool(true))
            },
        )])
        .unwrap();
        let mut sh = Interpreter::with_env(registry, Environment::at(".")).unwrap();
        let mut out = Vec::new();

        assert!(sh.run("count a b", &mut out).is_err());
        assert_eq!(calls.get(), 0);

        sh.run("count", &mut out).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_debug_mode_prints_tokens_and_ast() {
        let mut sh = Interpreter::with_env(echo_registry(), Environment::at(".")).unwrap();
        sh.env_mut().debug = true;
        let mut out = Vec::new();

        sh.run(r#"echo "x""#, &mut out).unwrap();
        let s = String::from_utf8(out).unwrap();

        assert!(s.contains("Tokens\nType: Value\nECHO: echo\nCONTENT: \"x\"\n"));
        assert!(s.contains("AST:\nECHO\n  CONTENT: x\n"));
    }

    #[test]
    fn test_debug_output_is_silent_by_default() {
        let mut sh = Interpreter::with_env(echo_registry(), Environment::at(".")).unwrap();
        let mut out = Vec::new();
        sh.run("echo", &mut out).unwrap();
        assert!(out.is_empty());
    }
}
