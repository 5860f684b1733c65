//! Debugger monitor session
//!
//! Owns the machine and the watchpoint pool and implements the monitor
//! commands on top of the evaluator and the change scanner.

pub mod command;
mod render;

pub use command::{Command, CommandError, InfoTarget, COMMANDS};

use thiserror::Error;

use crate::config::{LexerLimits, SdbConfig};
use crate::expr::{EvalError, Evaluator};
use crate::machine::{Machine, MachineError, SimpleMachine, Word, WORD_BYTES};
use crate::watch::{ScanReport, WatchError, Watchpoint, WatchpointId, WatchpointPool};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Machine(#[from] MachineError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Result of running instructions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Instructions actually executed
    pub executed: u64,
    /// Watchpoint changes and failures seen while stepping
    pub report: ScanReport,
}

impl StepOutcome {
    /// Whether stepping stopped early on a watchpoint
    pub fn stopped_by_watchpoint(&self) -> bool {
        self.report.changed()
    }
}

/// Text produced by one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// The command asked the front-end to exit
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

pub struct Session<M> {
    machine: M,
    pool: WatchpointPool,
    limits: LexerLimits,
}

impl Session<SimpleMachine> {
    /// A session over a fresh [`SimpleMachine`]
    pub fn from_config(config: &SdbConfig) -> Self {
        Self::new(
            SimpleMachine::new(&config.machine),
            WatchpointPool::from_config(&config.watchpoints),
            config.lexer,
        )
    }
}

impl<M: Machine> Session<M> {
    pub fn new(machine: M, pool: WatchpointPool, limits: LexerLimits) -> Self {
        Self {
            machine,
            pool,
            limits,
        }
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    pub fn pool(&self) -> &WatchpointPool {
        &self.pool
    }

    /// Evaluate an expression against the current machine state
    pub fn evaluate(&self, expr: &str) -> Result<Word, SessionError> {
        let evaluator = Evaluator::with_limits(&self.machine, self.limits);
        Ok(evaluator.evaluate(expr)?)
    }

    /// Evaluate `expr` now and watch it for changes
    pub fn watch(&mut self, expr: &str) -> Result<&Watchpoint, SessionError> {
        let expr = expr.trim();
        let value = self.evaluate(expr)?;
        let id = self.pool.watch(expr, value)?;
        log::info!("Watchpoint {}: {} = {}", id, expr, value);
        self.pool
            .get(id)
            .ok_or(SessionError::Watch(WatchError::NotFound { id }))
    }

    pub fn delete(&mut self, id: WatchpointId) -> Result<Watchpoint, SessionError> {
        Ok(self.pool.delete(id)?)
    }

    /// Active watchpoints, most recently created first
    pub fn watchpoints(&self) -> impl Iterator<Item = &Watchpoint> + '_ {
        self.pool.iter()
    }

    /// Re-check every watchpoint against the current machine state
    pub fn check_watchpoints(&mut self) -> ScanReport {
        let evaluator = Evaluator::with_limits(&self.machine, self.limits);
        self.pool.scan(|expr| evaluator.evaluate(expr))
    }

    /// Execute up to `count` instructions, checking watchpoints after each.
    ///
    /// Stops after the first instruction that changes a watched value.
    pub fn step(&mut self, count: u64) -> Result<StepOutcome, SessionError> {
        let mut outcome = StepOutcome::default();
        while outcome.executed < count {
            self.machine.step()?;
            outcome.executed += 1;

            let report = self.check_watchpoints();
            let hit = report.changed();
            outcome.report.merge(report);
            if hit {
                log::info!(
                    "stopped by watchpoint after {} instruction(s) at pc = {:#x}",
                    outcome.executed,
                    self.machine.pc()
                );
                break;
            }
        }
        Ok(outcome)
    }

    /// Read `count` consecutive words starting at the value of `expr`
    pub fn examine(&self, count: usize, expr: &str) -> Result<Vec<(Word, Word)>, SessionError> {
        let start = self.evaluate(expr)?;
        let mut words = Vec::with_capacity(count.min(1024));
        let mut addr = start;
        for _ in 0..count {
            words.push((addr, self.machine.read_word(addr)?));
            addr = addr.wrapping_add(WORD_BYTES as Word);
        }
        Ok(words)
    }

    /// Assign the value of `expr` to register `name`
    pub fn set_register(&mut self, name: &str, expr: &str) -> Result<Word, SessionError> {
        let value = self.evaluate(expr)?;
        self.machine.set_register(name, value)?;
        Ok(value)
    }

    pub fn registers(&self) -> Vec<(&'static str, Word)> {
        self.machine.registers()
    }

    /// Parse and run one line of monitor input
    pub fn execute_line(&mut self, line: &str) -> Result<Reply, SessionError> {
        match Command::parse(line)? {
            Some(command) => self.execute(command),
            None => Ok(Reply::default()),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply, SessionError> {
        let reply = match command {
            Command::Help => Reply::text(render::help()),
            Command::Quit => Reply {
                text: String::new(),
                quit: true,
            },
            Command::Step(count) => {
                let outcome = self.step(count)?;
                Reply::text(render::step(&outcome, self.machine.pc()))
            }
            Command::Info(InfoTarget::Registers) => Reply::text(render::registers(&self.registers())),
            Command::Info(InfoTarget::Watchpoints) => Reply::text(render::watchpoints(self.watchpoints())),
            Command::Examine { count, expr } => Reply::text(render::memory(&self.examine(count, &expr)?)),
            Command::Print(expr) => Reply::text(render::value(self.evaluate(&expr)?)),
            Command::Watch(expr) => {
                let wp = self.watch(&expr)?;
                Reply::text(format!("Watchpoint {}: {}", wp.id, wp.expression))
            }
            Command::Delete(id) => {
                let wp = self.delete(id)?;
                Reply::text(format!("Delete watchpoint {}: {}", wp.id, wp.expression))
            }
            Command::SetRegister { name, expr } => {
                let value = self.set_register(&name, &expr)?;
                Reply::text(format!("${} = {}", name, render::value(value)))
            }
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MachineConfig, WatchpointConfig};

    fn session() -> Session<SimpleMachine> {
        let config = SdbConfig {
            machine: MachineConfig {
                mem_base: 0x1000,
                mem_size: 0x100,
                reset_pc: 0x1000,
            },
            watchpoints: WatchpointConfig {
                capacity: 4,
                max_expr_len: 99,
            },
            ..SdbConfig::default()
        };
        Session::from_config(&config)
    }

    fn run(session: &mut Session<SimpleMachine>, line: &str) -> String {
        session.execute_line(line).unwrap().text
    }

    #[test]
    fn test_print() {
        let mut s = session();
        assert_eq!(run(&mut s, "p (1+2)*3"), "9 (0x9)");
        assert!(matches!(
            s.execute_line("p 1/0"),
            Err(SessionError::Eval(EvalError::DivisionByZero))
        ));
    }

    #[test]
    fn test_watch_list_delete() {
        let mut s = session();
        assert_eq!(run(&mut s, "info w"), "No watchpoints.");
        assert_eq!(run(&mut s, "w $pc"), "Watchpoint 0: $pc");
        assert_eq!(run(&mut s, "w $a0 + 1"), "Watchpoint 1: $a0 + 1");
        assert_eq!(
            run(&mut s, "info w"),
            "NUM     What\n1       $a0 + 1\n0       $pc"
        );
        assert_eq!(run(&mut s, "d 0"), "Delete watchpoint 0: $pc");
        assert!(matches!(
            s.execute_line("d 0"),
            Err(SessionError::Watch(WatchError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_watch_rejects_bad_expression_without_allocating() {
        let mut s = session();
        assert!(s.execute_line("w 1+").is_err());
        assert!(s.pool().is_empty());
    }

    #[test]
    fn test_pool_exhaustion_is_reported() {
        let mut s = session();
        for i in 0..4 {
            s.watch(&format!("{}", i)).unwrap();
        }
        assert!(matches!(
            s.watch("5"),
            Err(SessionError::Watch(WatchError::PoolExhausted { capacity: 4 }))
        ));
    }

    #[test]
    fn test_step_stops_on_watchpoint() {
        let mut s = session();
        s.watch("$pc == 0x100c").unwrap();

        let outcome = s.step(10).unwrap();
        assert_eq!(outcome.executed, 3);
        assert!(outcome.stopped_by_watchpoint());
        assert_eq!(outcome.report.changes[0].old, 0);
        assert_eq!(outcome.report.changes[0].new, 1);

        let outcome = s.step(1).unwrap();
        assert_eq!(outcome.executed, 1);
        assert_eq!(outcome.report.changes[0].new, 0);
    }

    #[test]
    fn test_step_without_watchpoints_runs_to_count() {
        let mut s = session();
        let outcome = s.step(5).unwrap();
        assert_eq!(outcome.executed, 5);
        assert!(!outcome.stopped_by_watchpoint());
        assert_eq!(s.machine().pc(), 0x1014);
        assert_eq!(run(&mut s, "si 0"), "");
    }

    #[test]
    fn test_unchanged_watchpoint_does_not_stop() {
        let mut s = session();
        s.watch("$a0").unwrap();
        let outcome = s.step(3).unwrap();
        assert_eq!(outcome.executed, 3);
        assert!(outcome.report.is_empty());
    }

    #[test]
    fn test_set_register_and_examine() {
        let mut s = session();
        assert_eq!(run(&mut s, "set $sp 0x1000 + 8"), "$sp = 4104 (0x1008)");
        s.machine_mut().write_word(0x1008, 7).unwrap();
        assert_eq!(s.examine(2, "$sp").unwrap(), vec![(0x1008, 7), (0x100c, 0)]);
        assert_eq!(run(&mut s, "p *$sp"), "7 (0x7)");
        assert!(matches!(
            s.examine(1, "0"),
            Err(SessionError::Machine(MachineError::AddressOutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_deep_expression_is_recoverable() {
        let config = SdbConfig::from_toml_str("[lexer]\nmax_tokens = 1000000\n").unwrap();
        let mut s = Session::from_config(&config);
        let line = format!("p {}1{}", "(".repeat(20_000), ")".repeat(20_000));
        assert!(matches!(
            s.execute_line(&line),
            Err(SessionError::Eval(EvalError::TooDeep { .. }))
        ));
        assert_eq!(run(&mut s, "p 8-3-2"), "7 (0x7)");
    }

    #[test]
    fn test_quit_and_help() {
        let mut s = session();
        assert!(s.execute_line("q").unwrap().quit);
        let help = run(&mut s, "help");
        assert!(help.contains("si [N]"));
        assert_eq!(s.execute_line("").unwrap(), Reply::default());
    }

    #[test]
    fn test_info_registers() {
        let mut s = session();
        let text = run(&mut s, "info r");
        assert!(text.lines().next().unwrap().starts_with("zero"));
        assert!(text.lines().last().unwrap().starts_with("pc"));
    }
}
