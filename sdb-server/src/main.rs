//! SDB Server
//!
//! JSON-RPC server that drives a debugger session.
//! Communicates via stdin/stdout for easy subprocess management.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use sdb_core::protocol::RpcMessage;
use sdb_core::{Request, Response, SdbConfig};
use tracing::{debug, error, info, Level};

mod handler;

/// Environment variable naming the config file
const CONFIG_ENV: &str = "SDB_CONFIG";

fn main() -> Result<()> {
    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = SdbConfig::load_or_default(config_path.as_deref())
        .with_context(|| format!("failed to load configuration (${})", CONFIG_ENV))?;

    // Initialize logging to stderr (stdout is for JSON-RPC)
    let level: Level = config.log_level.parse().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    info!("sdb-server starting...");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let mut handler = handler::Handler::new(&config);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to read line: {}", e);
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        debug!("Received: {}", line);

        let (response, shutdown) = match serde_json::from_str::<RpcMessage<Request>>(&line) {
            Ok(msg) => {
                let shutdown = matches!(msg.content, Request::Shutdown);
                let result = handler.handle(&msg.content);
                (RpcMessage::new(msg.id.unwrap_or(0), result), shutdown)
            }
            Err(e) => (
                RpcMessage::new(0, Response::error(format!("Parse error: {}", e))),
                false,
            ),
        };

        let response_json = serde_json::to_string(&response)?;
        debug!("Sending: {}", response_json);
        writeln!(stdout, "{}", response_json)?;
        stdout.flush()?;

        if shutdown {
            break;
        }
    }

    info!("sdb-server shutting down");
    Ok(())
}
