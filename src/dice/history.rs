use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::roll::RollResult;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Newest-first roll log with a fixed capacity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollHistory {
    capacity: usize,
    entries: VecDeque<RollResult>,
}

impl Default for RollHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl RollHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, result: RollResult) {
        self.entries.push_front(result);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&RollResult> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RollResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{roll_expression, Seed};

    #[test]
    fn newest_roll_comes_first() {
        let mut history = RollHistory::default();
        history.push(roll_expression("1d6", Some(Seed::from(1u32))));
        history.push(roll_expression("2d6", Some(Seed::from(2u32))));
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().map(|r| r.expr.as_str()), Some("2d6"));
        let order: Vec<&str> = history.iter().map(|r| r.expr.as_str()).collect();
        assert_eq!(order, ["2d6", "1d6"]);
    }

    #[test]
    fn oldest_roll_drops_past_capacity() {
        let mut history = RollHistory::with_capacity(3);
        for count in 1..=5u32 {
            history.push(roll_expression(&format!("{count}d6"), Some(Seed::from(count))));
        }
        assert_eq!(history.len(), 3);
        let order: Vec<&str> = history.iter().map(|r| r.expr.as_str()).collect();
        assert_eq!(order, ["5d6", "4d6", "3d6"]);
    }

    #[test]
    fn default_capacity_is_one_hundred() {
        let mut history = RollHistory::default();
        for _ in 0..150 {
            history.push(roll_expression("1d6", Some(Seed::from(9u32))));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        history.clear();
        assert!(history.is_empty());
    }
}
