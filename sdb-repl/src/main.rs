//! SDB interactive monitor
//!
//! Reads monitor commands line by line and runs them against a session over
//! the simple simulated machine.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sdb_core::{SdbConfig, Session, SimpleMachine};
use tracing::{debug, info, Level};

const PROMPT: &str = "(sdb) ";

#[derive(Parser, Debug)]
#[command(name = "sdb", version, about = "Simple debugger monitor")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read commands from stdin without a prompt or line editing
    #[arg(short, long)]
    batch: bool,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<Level>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = SdbConfig::load_or_default(args.config.as_deref())
        .context("failed to load configuration")?;

    let level = args
        .log_level
        .unwrap_or_else(|| config.log_level.parse().unwrap_or(Level::INFO));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let mut session = Session::from_config(&config);
    info!(
        "sdb ready: {} watchpoint slots, pc = {:#x}",
        session.pool().capacity(),
        config.machine.reset_pc
    );

    if args.batch {
        run_batch(&mut session)
    } else {
        run_interactive(&mut session)
    }
}

/// Run one line, printing its output. Returns `false` when the session should end.
fn dispatch(session: &mut Session<SimpleMachine>, line: &str) -> bool {
    debug!("command: {}", line);
    match session.execute_line(line) {
        Ok(reply) => {
            if !reply.text.is_empty() {
                println!("{}", reply.text);
            }
            !reply.quit
        }
        Err(e) => {
            println!("{}", e);
            true
        }
    }
}

fn run_batch(session: &mut Session<SimpleMachine>) -> Result<()> {
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        if !dispatch(session, &line) {
            break;
        }
    }
    Ok(())
}

fn run_interactive(session: &mut Session<SimpleMachine>) -> Result<()> {
    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if !dispatch(session, &line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read command"),
        }
    }
    Ok(())
}
