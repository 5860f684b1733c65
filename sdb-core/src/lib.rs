//! SDB Core Library
//!
//! Core functionality for a simulated-processor debugger:
//! - Expression tokenizing and evaluation
//! - Watchpoint pool and per-step change detection
//! - Machine state access and a minimal simulated machine
//! - Monitor session and command language
//! - JSON-RPC protocol types

pub mod config;
pub mod expr;
pub mod machine;
pub mod monitor;
pub mod protocol;
pub mod watch;

pub use config::SdbConfig;
pub use expr::{evaluate, EvalError, Evaluator};
pub use machine::{Machine, MachineAccess, SimpleMachine, Word};
pub use monitor::{Command, Session, SessionError};
pub use protocol::{Request, Response};
pub use watch::{ScanReport, WatchError, Watchpoint, WatchpointId, WatchpointPool};
