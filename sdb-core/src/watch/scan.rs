//! Per-step change detection over the active watchpoints

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pool::{WatchpointId, WatchpointPool};
use crate::expr::EvalError;
use crate::machine::Word;

/// A watchpoint whose value changed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchChange {
    pub id: WatchpointId,
    pub expression: String,
    pub old: Word,
    pub new: Word,
}

impl fmt::Display for WatchChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Watchpoint {}: {}\n  Old value = {} ({:#x})\n  New value = {} ({:#x})",
            self.id, self.expression, self.old, self.old, self.new, self.new
        )
    }
}

/// A watchpoint that could not be re-evaluated. Its stored value is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchFailure {
    pub id: WatchpointId,
    pub expression: String,
    pub error: EvalError,
}

impl fmt::Display for WatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Watchpoint {}: {}: {}", self.id, self.expression, self.error)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub changes: Vec<WatchChange>,
    pub failures: Vec<WatchFailure>,
}

impl ScanReport {
    /// Whether any watchpoint changed value
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.failures.is_empty()
    }

    pub fn merge(&mut self, other: ScanReport) {
        self.changes.extend(other.changes);
        self.failures.extend(other.failures);
    }
}

impl WatchpointPool {
    /// Re-evaluate every active watchpoint once, in active-list order.
    ///
    /// Values that differ from the stored one are recorded and stored.
    pub fn scan<F>(&mut self, mut evaluate: F) -> ScanReport
    where
        F: FnMut(&str) -> Result<Word, EvalError>,
    {
        let mut report = ScanReport::default();
        let mut cursor = self.active;

        while let Some(index) = cursor {
            let slot = &mut self.slots[index];
            cursor = slot.next;

            let wp = &mut slot.watchpoint;
            match evaluate(&wp.expression) {
                Ok(value) if value != wp.last_value => {
                    log::info!(
                        "watchpoint {} ({}) changed: {} -> {}",
                        wp.id,
                        wp.expression,
                        wp.last_value,
                        value
                    );
                    report.changes.push(WatchChange {
                        id: wp.id,
                        expression: wp.expression.clone(),
                        old: wp.last_value,
                        new: value,
                    });
                    wp.last_value = value;
                }
                Ok(_) => {}
                Err(error) => {
                    log::warn!("watchpoint {} ({}) failed: {}", wp.id, wp.expression, error);
                    report.failures.push(WatchFailure {
                        id: wp.id,
                        expression: wp.expression.clone(),
                        error,
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::evaluate;
    use crate::machine::SimpleMachine;

    #[test]
    fn test_scan_reports_single_change_then_nothing() {
        let mut machine = SimpleMachine::default();
        let mut pool = WatchpointPool::default();
        for reg in ["a0", "a1", "a2"] {
            let expr = format!("${}", reg);
            let value = evaluate(&expr, &machine).unwrap();
            pool.watch(&expr, value).unwrap();
        }

        machine.set_register("a1", 5).unwrap();
        let report = pool.scan(|expr| evaluate(expr, &machine));
        assert!(report.changed());
        assert_eq!(
            report.changes,
            vec![WatchChange {
                id: WatchpointId(1),
                expression: "$a1".to_string(),
                old: 0,
                new: 5,
            }]
        );
        assert_eq!(pool.get(WatchpointId(1)).unwrap().last_value, 5);

        let report = pool.scan(|expr| evaluate(expr, &machine));
        assert!(!report.changed());
        assert!(report.is_empty());
    }

    #[test]
    fn test_scan_visits_each_active_once_in_order() {
        let mut pool = WatchpointPool::new(8, 99);
        pool.watch("1", 0).unwrap();
        pool.watch("2", 0).unwrap();
        pool.watch("3", 0).unwrap();
        pool.delete(WatchpointId(1)).unwrap();

        let mut visited = Vec::new();
        let report = pool.scan(|expr| {
            visited.push(expr.to_string());
            expr.parse::<Word>().map_err(|_| EvalError::EmptyExpression)
        });
        assert_eq!(visited, vec!["3", "1"]);
        assert_eq!(report.changes.len(), 2);
        assert_eq!(report.changes[0].id, WatchpointId(2));
    }

    #[test]
    fn test_scan_on_empty_pool() {
        let mut pool = WatchpointPool::default();
        let report = pool.scan(|_| unreachable!("no active watchpoints"));
        assert!(report.is_empty());
    }

    #[test]
    fn test_scan_failure_keeps_old_value() {
        let mut machine = SimpleMachine::default();
        machine.set_register("a0", 2).unwrap();
        let mut pool = WatchpointPool::default();
        let id = pool.watch("10/$a0", 5).unwrap();

        machine.set_register("a0", 0).unwrap();
        let report = pool.scan(|expr| evaluate(expr, &machine));
        assert!(!report.changed());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error, EvalError::DivisionByZero);
        assert_eq!(pool.get(id).unwrap().last_value, 5);
    }

    #[test]
    fn test_change_display() {
        let change = WatchChange {
            id: WatchpointId(3),
            expression: "$pc".to_string(),
            old: 16,
            new: 20,
        };
        assert_eq!(
            change.to_string(),
            "Watchpoint 3: $pc\n  Old value = 16 (0x10)\n  New value = 20 (0x14)"
        );
    }
}
