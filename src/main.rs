use anyhow::{Context, Result};
use argh::FromArgs;
use jobs::Interpreter;
use jobs::env::Environment;
use jobs::registry::Registry;
use std::io::Write;
use std::path::PathBuf;

#[derive(FromArgs)]
/// Jobs terminal: type commands in plain English.
struct Args {
    #[argh(switch, short = 'd')]
    /// print tokens and the parse tree of every line before running it.
    debug: bool,

    #[argh(option, short = 'c')]
    /// run a single line and exit instead of starting the interactive shell.
    command: Option<String>,

    #[argh(option, short = 'C')]
    /// folder to start in. Defaults to the current folder.
    dir: Option<PathBuf>,

    #[argh(switch)]
    /// do not print the welcome message.
    no_banner: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Args = argh::from_env();

    let mut env = Environment::new();
    if let Some(dir) = &args.dir {
        let canonical = std::fs::canonicalize(dir)
            .with_context(|| format!("can't open start folder {}", dir.display()))?;
        std::env::set_current_dir(&canonical)
            .with_context(|| format!("can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
    }
    env.debug = args.debug;

    let registry = Registry::with_builtins().context("invalid command table")?;
    let mut sh = Interpreter::with_env(registry, env).context("can't build the lexer")?;

    if let Some(line) = args.command {
        let mut stdout = std::io::stdout();
        let result = sh.run(&line, &mut stdout);
        if let Err(e) = &result {
            e.write_to(&mut stdout)?;
        }
        stdout.flush()?;
        std::process::exit(if result.is_ok() { 0 } else { 1 });
    }

    if !args.no_banner {
        println!("Jobs terminal");
        println!("If you are new to Jobs type \"help\" for mini-guide\n");
    }

    sh.repl()
}
