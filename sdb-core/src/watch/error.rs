//! Watchpoint error types

use thiserror::Error;

use super::pool::WatchpointId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("No free watchpoints: all {capacity} slots are in use")]
    PoolExhausted { capacity: usize },

    #[error("Watchpoint {id} not found")]
    NotFound { id: WatchpointId },

    #[error("Expression is {len} bytes long, watchpoints hold at most {limit}")]
    ExpressionTooLong { len: usize, limit: usize },
}
