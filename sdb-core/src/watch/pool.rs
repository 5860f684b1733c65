//! Fixed-capacity watchpoint pool
//!
//! All slots live in one vector for the pool's lifetime. Two singly linked
//! lists thread through them by index: `active` (most recently created
//! first) and `free`. Every slot is on exactly one of the two.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::WatchError;
use crate::config::WatchpointConfig;
use crate::machine::Word;

/// Watchpoint number. Equal to the slot index and fixed for the pool's lifetime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct WatchpointId(pub usize);

impl fmt::Display for WatchpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A tracked expression and the value it had at the last check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Watchpoint {
    pub id: WatchpointId,
    pub expression: String,
    pub last_value: Word,
}

#[derive(Debug, Clone)]
pub(super) struct Slot {
    pub(super) watchpoint: Watchpoint,
    pub(super) active: bool,
    pub(super) next: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct WatchpointPool {
    pub(super) slots: Vec<Slot>,
    pub(super) active: Option<usize>,
    free: Option<usize>,
    len: usize,
    max_expr_len: usize,
}

impl WatchpointPool {
    /// Create a pool with every slot on the free list, in ascending id order
    pub fn new(capacity: usize, max_expr_len: usize) -> Self {
        let slots = (0..capacity)
            .map(|i| Slot {
                watchpoint: Watchpoint {
                    id: WatchpointId(i),
                    expression: String::new(),
                    last_value: 0,
                },
                active: false,
                next: (i + 1 < capacity).then_some(i + 1),
            })
            .collect();

        Self {
            slots,
            active: None,
            free: (capacity > 0).then_some(0),
            len: 0,
            max_expr_len,
        }
    }

    pub fn from_config(config: &WatchpointConfig) -> Self {
        Self::new(config.capacity, config.max_expr_len)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of active watchpoints
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.len
    }

    /// Move a free slot to the head of the active list
    pub fn watch(&mut self, expression: &str, initial_value: Word) -> Result<WatchpointId, WatchError> {
        if expression.len() > self.max_expr_len {
            return Err(WatchError::ExpressionTooLong {
                len: expression.len(),
                limit: self.max_expr_len,
            });
        }
        let index = self.free.ok_or(WatchError::PoolExhausted {
            capacity: self.capacity(),
        })?;

        let slot = &mut self.slots[index];
        self.free = slot.next;
        slot.next = self.active;
        slot.active = true;
        slot.watchpoint.expression.clear();
        slot.watchpoint.expression.push_str(expression);
        slot.watchpoint.last_value = initial_value;
        self.active = Some(index);
        self.len += 1;

        log::debug!("watchpoint {} allocated for {:?}", index, expression);
        Ok(WatchpointId(index))
    }

    /// Move an active slot back to the free list, returning what it watched
    pub fn delete(&mut self, id: WatchpointId) -> Result<Watchpoint, WatchError> {
        let index = id.0;
        if !self.slots.get(index).is_some_and(|slot| slot.active) {
            return Err(WatchError::NotFound { id });
        }

        let after = self.slots[index].next;
        if self.active == Some(index) {
            self.active = after;
        } else {
            let mut cursor = self.active;
            while let Some(i) = cursor {
                if self.slots[i].next == Some(index) {
                    self.slots[i].next = after;
                    break;
                }
                cursor = self.slots[i].next;
            }
        }

        let slot = &mut self.slots[index];
        slot.active = false;
        slot.next = self.free;
        self.free = Some(index);
        self.len -= 1;

        log::debug!("watchpoint {} released", index);
        Ok(slot.watchpoint.clone())
    }

    /// An active watchpoint by id
    pub fn get(&self, id: WatchpointId) -> Option<&Watchpoint> {
        self.slots
            .get(id.0)
            .filter(|slot| slot.active)
            .map(|slot| &slot.watchpoint)
    }

    /// Active watchpoints, most recently created first
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            pool: self,
            cursor: self.active,
        }
    }
}

impl Default for WatchpointPool {
    fn default() -> Self {
        Self::from_config(&WatchpointConfig::default())
    }
}

/// Walks the active list
pub struct Iter<'a> {
    pool: &'a WatchpointPool,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Watchpoint;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = &self.pool.slots[self.cursor?];
        self.cursor = slot.next;
        Some(&slot.watchpoint)
    }
}

impl<'a> IntoIterator for &'a WatchpointPool {
    type Item = &'a Watchpoint;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(pool: &WatchpointPool) -> Vec<usize> {
        pool.iter().map(|wp| wp.id.0).collect()
    }

    /// Every slot appears on exactly one list
    fn assert_partition(pool: &WatchpointPool) {
        let mut seen = vec![0u8; pool.capacity()];
        let mut walk = |mut cursor: Option<usize>, active: bool| {
            while let Some(i) = cursor {
                seen[i] += 1;
                assert_eq!(pool.slots[i].active, active, "slot {} on wrong list", i);
                cursor = pool.slots[i].next;
            }
        };
        walk(pool.active, true);
        walk(pool.free, false);
        assert!(seen.iter().all(|&n| n == 1), "partition broken: {:?}", seen);
    }

    #[test]
    fn test_new_pool_is_all_free() {
        let pool = WatchpointPool::default();
        assert_eq!(pool.capacity(), 32);
        assert_eq!(pool.free_count(), 32);
        assert!(pool.is_empty());
        assert_eq!(pool.iter().count(), 0);
        assert_partition(&pool);
    }

    #[test]
    fn test_watch_assigns_lowest_free_slot_and_lists_newest_first() {
        let mut pool = WatchpointPool::new(4, 99);
        assert_eq!(pool.watch("$a0", 1).unwrap(), WatchpointId(0));
        assert_eq!(pool.watch("$a1", 2).unwrap(), WatchpointId(1));
        assert_eq!(pool.watch("$a2", 3).unwrap(), WatchpointId(2));

        assert_eq!(ids(&pool), vec![2, 1, 0]);
        let wp = pool.get(WatchpointId(1)).unwrap();
        assert_eq!(wp.expression, "$a1");
        assert_eq!(wp.last_value, 2);
        assert_partition(&pool);
    }

    #[test]
    fn test_exhaustion_is_recoverable() {
        let mut pool = WatchpointPool::new(32, 99);
        for i in 0..32 {
            pool.watch(&format!("{}", i), 0).unwrap();
        }
        assert_eq!(
            pool.watch("1", 0),
            Err(WatchError::PoolExhausted { capacity: 32 })
        );
        assert_eq!(pool.len(), 32);

        pool.delete(WatchpointId(7)).unwrap();
        assert_eq!(pool.watch("again", 0).unwrap(), WatchpointId(7));
        assert_partition(&pool);
    }

    #[test]
    fn test_delete_head_keeps_rest() {
        let mut pool = WatchpointPool::new(4, 99);
        pool.watch("a", 0).unwrap();
        pool.watch("b", 0).unwrap();
        pool.watch("c", 0).unwrap();

        let removed = pool.delete(WatchpointId(2)).unwrap();
        assert_eq!(removed.expression, "c");
        assert_eq!(ids(&pool), vec![1, 0]);
        assert_partition(&pool);
    }

    #[test]
    fn test_delete_middle_and_tail() {
        let mut pool = WatchpointPool::new(4, 99);
        for expr in ["a", "b", "c", "d"] {
            pool.watch(expr, 0).unwrap();
        }
        pool.delete(WatchpointId(2)).unwrap();
        assert_eq!(ids(&pool), vec![3, 1, 0]);
        pool.delete(WatchpointId(0)).unwrap();
        assert_eq!(ids(&pool), vec![3, 1]);
        assert_partition(&pool);
    }

    #[test]
    fn test_delete_unknown_id_changes_nothing() {
        let mut pool = WatchpointPool::new(4, 99);
        pool.watch("a", 0).unwrap();

        assert_eq!(
            pool.delete(WatchpointId(3)),
            Err(WatchError::NotFound { id: WatchpointId(3) })
        );
        assert_eq!(
            pool.delete(WatchpointId(99)),
            Err(WatchError::NotFound { id: WatchpointId(99) })
        );
        pool.delete(WatchpointId(0)).unwrap();
        assert_eq!(
            pool.delete(WatchpointId(0)),
            Err(WatchError::NotFound { id: WatchpointId(0) })
        );
        assert_eq!(pool.free_count(), 4);
        assert_partition(&pool);
    }

    #[test]
    fn test_expression_length_limit() {
        let mut pool = WatchpointPool::new(2, 4);
        assert!(pool.watch("1234", 0).is_ok());
        assert_eq!(
            pool.watch("12345", 0),
            Err(WatchError::ExpressionTooLong { len: 5, limit: 4 })
        );
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_iter_is_restartable() {
        let mut pool = WatchpointPool::new(4, 99);
        pool.watch("a", 0).unwrap();
        pool.watch("b", 0).unwrap();
        let first: Vec<_> = pool.iter().map(|wp| wp.expression.clone()).collect();
        let second: Vec<_> = (&pool).into_iter().map(|wp| wp.expression.clone()).collect();
        assert_eq!(first, vec!["b", "a"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_capacity_pool() {
        let mut pool = WatchpointPool::new(0, 99);
        assert_eq!(
            pool.watch("1", 0),
            Err(WatchError::PoolExhausted { capacity: 0 })
        );
    }
}
