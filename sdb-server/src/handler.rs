//! Request handler for sdb-server

use sdb_core::protocol::{MemoryWord, RegisterValue};
use sdb_core::{Machine, Request, Response, SdbConfig, Session, SimpleMachine};
use tracing::{debug, info, warn};

pub struct Handler {
    session: Session<SimpleMachine>,
}

impl Handler {
    pub fn new(config: &SdbConfig) -> Self {
        Self {
            session: Session::from_config(config),
        }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        match request {
            Request::Eval { expr } => self.handle_eval(expr),
            Request::Watch { expr } => self.handle_watch(expr),
            Request::Delete { id } => match self.session.delete(*id) {
                Ok(wp) => {
                    info!("Deleted watchpoint {}: {}", wp.id, wp.expression);
                    Response::Watchpoint { watchpoint: wp }
                }
                Err(e) => Response::error(e.to_string()),
            },
            Request::List => Response::Watchpoints {
                watchpoints: self.session.watchpoints().cloned().collect(),
            },
            Request::Step { count } => self.handle_step(*count),
            Request::Registers => Response::Registers {
                registers: self
                    .session
                    .registers()
                    .into_iter()
                    .map(|(name, value)| RegisterValue {
                        name: name.to_string(),
                        value,
                    })
                    .collect(),
            },
            Request::Examine { count, expr } => match self.session.examine(*count, expr) {
                Ok(words) => Response::Memory {
                    words: words
                        .into_iter()
                        .map(|(addr, value)| MemoryWord { addr, value })
                        .collect(),
                },
                Err(e) => Response::error(e.to_string()),
            },
            Request::SetRegister { name, expr } => match self.session.set_register(name, expr) {
                Ok(value) => Response::value(value),
                Err(e) => Response::error(e.to_string()),
            },
            Request::Shutdown => {
                info!("Shutdown requested");
                Response::success()
            }
        }
    }

    fn handle_eval(&self, expr: &str) -> Response {
        debug!("Eval request: expr={}", expr);

        match self.session.evaluate(expr) {
            Ok(value) => Response::value(value),
            Err(e) => Response::error(e.to_string()),
        }
    }

    fn handle_watch(&mut self, expr: &str) -> Response {
        debug!("Watch request: expr={}", expr);

        match self.session.watch(expr) {
            Ok(wp) => {
                info!("Watchpoint {}: {}", wp.id, wp.expression);
                Response::Watchpoint {
                    watchpoint: wp.clone(),
                }
            }
            Err(e) => {
                warn!("Failed to create watchpoint for {:?}: {}", expr, e);
                Response::error(e.to_string())
            }
        }
    }

    fn handle_step(&mut self, count: u64) -> Response {
        debug!("Step request: count={}", count);

        match self.session.step(count) {
            Ok(outcome) => Response::Step {
                executed: outcome.executed,
                pc: self.session.machine().pc(),
                stopped: outcome.stopped_by_watchpoint(),
                changes: outcome.report.changes,
                failures: outcome
                    .report
                    .failures
                    .iter()
                    .map(|failure| failure.to_string())
                    .collect(),
            },
            Err(e) => Response::error(e.to_string()),
        }
    }
}
