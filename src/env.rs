use std::env as stdenv;
use std::path::{Component, Path, PathBuf};

/// Mutable, process-level state that commands read and change.
///
/// The environment contains:
/// - `current_dir`: the folder relative paths are resolved against.
/// - `should_exit`: set by `exit` to tell the REPL loop to stop.
/// - `debug`: when true the pipeline prints tokens and the AST of every line.
///
/// It is threaded explicitly into every command call; commands never reach for
/// globals.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that an interactive loop should exit.
    pub should_exit: bool,
    /// Print the token stream and AST before executing each line.
    pub debug: bool,
}

impl Environment {
    /// Capture the process's working directory into a new `Environment`.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::at(current_dir)
    }

    /// An environment rooted at `dir`. The process working directory is left alone.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: dir.into(),
            should_exit: false,
            debug: false,
        }
    }

    /// Resolve `target` against the current directory.
    pub fn resolve(&self, target: impl AsRef<Path>) -> PathBuf {
        let target = target.as_ref();
        if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.current_dir.join(target)
        }
    }

    /// Shortened current directory followed by `"> "`.
    ///
    /// Paths with more than two components are cut down to their last two,
    /// e.g. `.../projects/jobs> `.
    pub fn prompt(&self) -> String {
        let parts: Vec<String> = self
            .current_dir
            .components()
            .filter(|c| !matches!(c, Component::RootDir))
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let sep = std::path::MAIN_SEPARATOR;

        let short = match parts.len() {
            0 => sep.to_string(),
            1 | 2 => self.current_dir.to_string_lossy().into_owned(),
            n => format!("...{sep}{}{sep}{}", parts[n - 2], parts[n - 1]),
        };
        format!("{short}> ")
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
