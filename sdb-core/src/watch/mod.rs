//! Watchpoints
//!
//! A bounded pool of watched expressions and the change scan that runs after
//! every executed instruction.

pub mod error;
pub mod pool;
pub mod scan;

pub use error::WatchError;
pub use pool::{Watchpoint, WatchpointId, WatchpointPool};
pub use scan::{ScanReport, WatchChange, WatchFailure};
