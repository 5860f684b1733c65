//! JSON-RPC Protocol definitions
//!
//! Defines the communication protocol between a debugger front-end and sdb-server.

use serde::{Deserialize, Serialize};

use crate::machine::Word;
use crate::watch::{WatchChange, Watchpoint, WatchpointId};

fn one() -> u64 {
    1
}

/// Request from a front-end to sdb-server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", content = "params")]
pub enum Request {
    /// Evaluate an expression
    #[serde(rename = "eval")]
    Eval { expr: String },

    /// Create a watchpoint
    #[serde(rename = "watch")]
    Watch { expr: String },

    /// Delete a watchpoint
    #[serde(rename = "delete")]
    Delete { id: WatchpointId },

    /// List active watchpoints
    #[serde(rename = "list")]
    List,

    /// Execute instructions, checking watchpoints after each
    #[serde(rename = "step")]
    Step {
        #[serde(default = "one")]
        count: u64,
    },

    /// Dump registers
    #[serde(rename = "registers")]
    Registers,

    /// Read memory words
    #[serde(rename = "examine")]
    Examine { count: usize, expr: String },

    /// Assign an expression's value to a register
    #[serde(rename = "set_register")]
    SetRegister { name: String, expr: String },

    /// Shutdown the server
    #[serde(rename = "shutdown")]
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterValue {
    pub name: String,
    pub value: Word,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryWord {
    pub addr: Word,
    pub value: Word,
}

/// Response from sdb-server to a front-end
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Response {
    Value { value: Word, hex: String },
    Watchpoint { watchpoint: Watchpoint },
    Watchpoints { watchpoints: Vec<Watchpoint> },
    Step {
        executed: u64,
        pc: Word,
        stopped: bool,
        changes: Vec<WatchChange>,
        failures: Vec<String>,
    },
    Registers { registers: Vec<RegisterValue> },
    Memory { words: Vec<MemoryWord> },
    Success { ok: bool },
    Error { error: String },
}

impl Response {
    pub fn success() -> Self {
        Response::Success { ok: true }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Response::Error { error: msg.into() }
    }

    pub fn value(value: Word) -> Self {
        Response::Value {
            value,
            hex: format!("{:#x}", value),
        }
    }
}

/// JSON-RPC message wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcMessage<T> {
    pub jsonrpc: String,
    pub id: Option<u64>,
    #[serde(flatten)]
    pub content: T,
}

impl<T> RpcMessage<T> {
    pub fn new(id: u64, content: T) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialize() {
        let req = Request::Watch {
            expr: "$pc".to_string(),
        };

        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"method\":\"watch\""));
        assert!(json.contains("\"expr\":\"$pc\""));
    }

    #[test]
    fn test_request_from_line() {
        let line = r#"{"jsonrpc":"2.0","id":7,"method":"delete","params":{"id":3}}"#;
        let msg: RpcMessage<Request> = serde_json::from_str(line).unwrap();
        assert_eq!(msg.id, Some(7));
        assert_eq!(msg.content, Request::Delete { id: WatchpointId(3) });
    }

    #[test]
    fn test_unit_request_without_params() {
        let line = r#"{"jsonrpc":"2.0","id":1,"method":"list"}"#;
        let msg: RpcMessage<Request> = serde_json::from_str(line).unwrap();
        assert_eq!(msg.content, Request::List);
    }

    #[test]
    fn test_step_count_defaults_to_one() {
        let req: Request = serde_json::from_str(r#"{"method":"step","params":{}}"#).unwrap();
        assert_eq!(req, Request::Step { count: 1 });
    }

    #[test]
    fn test_response_serialize() {
        let json = serde_json::to_string(&Response::value(255)).unwrap();
        assert_eq!(json, r#"{"value":255,"hex":"0xff"}"#);

        let json = serde_json::to_string(&RpcMessage::new(2, Response::error("boom"))).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"error\":\"boom\""));
    }
}
