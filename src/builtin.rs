use crate::command::{CommandDescriptor, Context, ExecutableCommand, Kwargs, Value};
use crate::error::{JobsError, Result};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Built-in commands known to the shell at compile time.
///
/// Each builtin declares its tag, spellings and documentation statically and
/// is turned into a [`CommandDescriptor`] by [`descriptors`].
pub(crate) trait BuiltinCommand: Default + 'static {
    /// Internal tag, e.g. "LOG".
    fn name() -> &'static str;

    /// Every accepted spelling, the common one first.
    fn spellings() -> &'static [&'static str];

    fn description() -> &'static str;

    fn usage() -> &'static str;

    /// Executes the command. Arguments arrive unquoted and unchecked.
    fn run(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Value>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(&self, args: &[String], _kwargs: &Kwargs, ctx: &mut Context<'_>) -> Result<Value> {
        self.run(args, ctx)
    }
}

fn descriptor<T: BuiltinCommand>() -> CommandDescriptor {
    CommandDescriptor::new(T::name(), T::spellings(), T::default())
        .with_description(T::description())
        .with_usage(T::usage())
}

/// Descriptors of every builtin, in the order they are offered to the lexer
/// and listed by `help`.
pub(crate) fn descriptors() -> Vec<CommandDescriptor> {
    vec![
        descriptor::<Log>(),
        descriptor::<MoveTo>(),
        descriptor::<MoveUp>(),
        descriptor::<Show>(),
        descriptor::<Help>(),
        descriptor::<Exit>(),
        descriptor::<DebugMode>(),
        descriptor::<UserMode>(),
    ]
}

/// Write your content into the console.
#[derive(Default)]
pub struct Log;

impl BuiltinCommand for Log {
    fn name() -> &'static str {
        "LOG"
    }

    fn spellings() -> &'static [&'static str] {
        &["log", "print", "write"]
    }

    fn description() -> &'static str {
        "writes your content into console"
    }

    fn usage() -> &'static str {
        "log [any content] || log [any content] with [any content] with [any content]..."
    }

    fn run(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Value> {
        let content = args.concat();
        ctx.print(format_args!("\n{content}\n\n"));
        Ok(Value::Text(content))
    }
}

/// Change the current folder.
#[derive(Default)]
pub struct MoveTo;

impl BuiltinCommand for MoveTo {
    fn name() -> &'static str {
        "MOVETO"
    }

    fn spellings() -> &'static [&'static str] {
        &["move to", "cd"]
    }

    fn description() -> &'static str {
        "changes current folder you are in. Affects on relative paths"
    }

    fn usage() -> &'static str {
        "move to [next folder] || move to \"..\" (moves up one folder) || move to [path/some/where]"
    }

    fn run(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Value> {
        let [target] = args else {
            return Err(JobsError::arguments(format!(
                "command move to needs only 1 argument as a path to your folder, not {}",
                args.len()
            )));
        };

        let new_dir = ctx.env.resolve(target);
        if !new_dir.is_dir() {
            return Err(JobsError::security(format!(
                "This folder ({target}) does not exist"
            )));
        }

        let canonical = enter(&new_dir).map_err(|e| folder_error(e, target))?;
        log::info!("moved to {}", canonical.display());
        ctx.env.current_dir = canonical;

        ctx.print(format_args!("\nMoved to {target}\n\n"));
        Ok(Value::Text(target.clone()))
    }
}

/// Change the current folder to the upper one.
#[derive(Default)]
pub struct MoveUp;

impl BuiltinCommand for MoveUp {
    fn name() -> &'static str {
        "MOVEUP"
    }

    fn spellings() -> &'static [&'static str] {
        &["move up", "move back"]
    }

    fn description() -> &'static str {
        "change folder to upper one. Works like (move to \"..\")"
    }

    fn usage() -> &'static str {
        "move up"
    }

    fn run(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Value> {
        if !args.is_empty() {
            return Err(JobsError::arguments(format!(
                "command move up doesn't need any arguments, got {}",
                args.len()
            )));
        }

        // `..` of the root is the root itself.
        let parent = ctx.env.current_dir.join("..");
        let canonical = enter(&parent)
            .map_err(|e| folder_error(e, &ctx.env.current_dir.display().to_string()))?;

        let leaf = canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| canonical.display().to_string());
        log::info!("moved up to {}", canonical.display());
        ctx.env.current_dir = canonical;

        ctx.print(format_args!("\nMoved up to {leaf}\n\n"));
        Ok(Value::Text(leaf))
    }
}

/// Canonicalize `dir` and make it the process's working directory.
fn enter(dir: &Path) -> io::Result<PathBuf> {
    let canonical = fs::canonicalize(dir)?;
    env::set_current_dir(&canonical)?;
    Ok(canonical)
}

fn folder_error(e: io::Error, folder: &str) -> JobsError {
    match e.kind() {
        io::ErrorKind::NotFound => {
            JobsError::security(format!("This folder ({folder}) does not exist"))
        }
        io::ErrorKind::PermissionDenied => JobsError::security(format!(
            "Jobs don't have enough permission to get in {folder} folder"
        )),
        _ => JobsError::security(format!("can't get in {folder} folder: {e}")),
    }
}

/// List files or folders of the current folder.
#[derive(Default)]
pub struct Show;

impl BuiltinCommand for Show {
    fn name() -> &'static str {
        "SHOW"
    }

    fn spellings() -> &'static [&'static str] {
        &["show", "ls", "list"]
    }

    fn description() -> &'static str {
        "writes out all files or folders that are in your current folder"
    }

    fn usage() -> &'static str {
        "show \"files\" || show \"folders\" || show \"files\" with \"nested\""
    }

    fn run(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Value> {
        let dir = ctx.env.current_dir.clone();
        let (header, paths) = match args {
            [kind] if kind == "files" => ("File", list_children(&dir, Path::is_file)?),
            [kind] if kind == "folders" => ("Folder", list_children(&dir, Path::is_dir)?),
            [kind] => {
                return Err(JobsError::arguments(format!(
                    "first argument ({kind}) should be either \"files\" or \"folders\""
                )));
            }
            [kind, depth] if kind == "files" && depth == "nested" => {
                let mut files = Vec::new();
                collect_nested_files(&dir, &mut files)
                    .map_err(|e| folder_error(e, &dir.display().to_string()))?;
                files.sort();
                ("File", files)
            }
            [first, second] => {
                return Err(JobsError::arguments(format!(
                    "in that case first and second arguments can't be {first} and {second}"
                )));
            }
            _ => {
                return Err(JobsError::arguments(format!(
                    "command show needs 1 or 2 arguments, got {}",
                    args.len()
                )));
            }
        };

        let rows: Vec<Vec<String>> = paths
            .iter()
            .map(|p| vec![file_name(p)])
            .collect();
        ctx.print(format_args!("\n{}\n", render_table(&[header], &rows)));

        Ok(Value::Paths(paths))
    }
}

/// Direct children of `dir` that satisfy `keep`, sorted. Unreadable entries are skipped.
fn list_children(dir: &Path, keep: fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| folder_error(e, &dir.display().to_string()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| keep(path))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Every file below `dir`. Subfolders that can't be read are skipped; symlinked
/// folders are not followed.
fn collect_nested_files(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)?.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_dir() => {
                if let Err(e) = collect_nested_files(&path, out) {
                    log::debug!("skipping {}: {e}", path.display());
                }
            }
            Ok(_) if path.is_file() => out.push(path),
            _ => {}
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Show the documentation of every installed command.
#[derive(Default)]
pub struct Help;

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "HELP"
    }

    fn spellings() -> &'static [&'static str] {
        &["help"]
    }

    fn description() -> &'static str {
        "shows a table with all commands and their documentation"
    }

    fn usage() -> &'static str {
        "help"
    }

    fn run(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Value> {
        let rows: Vec<Vec<String>> = ctx
            .registry
            .all()
            .map(|c| {
                vec![
                    c.friendly_name(),
                    c.description().to_string(),
                    c.usage().to_string(),
                ]
            })
            .collect();
        let table = render_table(&["Command", "Action", "Usage"], &rows);

        ctx.print(format_args!("\n{table}\n"));
        Ok(Value::Text(table))
    }
}

/// Close the terminal.
#[derive(Default)]
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "EXIT"
    }

    fn spellings() -> &'static [&'static str] {
        &["exit", "quit", "logout", "close", "altf4"]
    }

    fn description() -> &'static str {
        "closes the terminal"
    }

    fn usage() -> &'static str {
        "exit"
    }

    fn run(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Value> {
        ctx.env.should_exit = true;
        Ok(Value::Bool(true))
    }
}

/// Print tokens and AST of every following line.
#[derive(Default)]
pub struct DebugMode;

impl BuiltinCommand for DebugMode {
    fn name() -> &'static str {
        "DEBUG"
    }

    fn spellings() -> &'static [&'static str] {
        &["debug mode"]
    }

    fn description() -> &'static str {
        "shows the lexer's and parser's result before running each line (for developers)"
    }

    fn usage() -> &'static str {
        "debug mode"
    }

    fn run(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Value> {
        ctx.env.debug = true;
        Ok(Value::Bool(true))
    }
}

#[derive(Default)]
pub struct UserMode;

impl BuiltinCommand for UserMode {
    fn name() -> &'static str {
        "USER"
    }

    fn spellings() -> &'static [&'static str] {
        &["user mode"]
    }

    fn description() -> &'static str {
        "turns off debug mode"
    }

    fn usage() -> &'static str {
        "user mode"
    }

    fn run(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Value> {
        ctx.env.debug = false;
        Ok(Value::Bool(false))
    }
}

/// Plain text table with a rounded border, one header row and a blank line
/// between data rows.
pub(crate) fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = table_rule(&widths, '╭', '┬', '╮');
    out.push_str(&table_line(&widths, headers));
    out.push_str(&table_rule(&widths, '├', '┼', '┤'));
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push_str(&table_line(&widths, &[]));
        }
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&table_line(&widths, &cells));
    }
    out.push_str(&table_rule(&widths, '╰', '┴', '╯'));
    out
}

fn table_rule(widths: &[usize], left: char, mid: char, right: char) -> String {
    let parts: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}\n", parts.join(&mid.to_string()))
}

/// Missing cells are left blank.
fn table_line(widths: &[usize], cells: &[&str]) -> String {
    let parts: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let cell = cells.get(i).copied().unwrap_or("");
            let pad = w.saturating_sub(cell.chars().count());
            format!(" {cell}{} ", " ".repeat(pad))
        })
        .collect();
    format!("│{}│\n", parts.join("│"))
}
