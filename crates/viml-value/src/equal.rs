//! Structural equality.
//!
//! Cyclic structures are handled the legacy way: nesting is bounded by a
//! budget that shrinks every time it is hit, and a comparison that runs out
//! of budget reports the remaining substructures as equal. This is not a
//! sound cycle detector. Two different cyclic structures can compare equal.

use crate::heap::{DictId, Heap, ListId};
use crate::value::Value;

/// Nesting budget at the start of a top-level comparison.
pub const EQUAL_RECURSION_LIMIT: usize = 1000;

/// State carried through one top-level comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EqualBudget {
    depth: usize,
    limit: usize,
}

impl Default for EqualBudget {
    fn default() -> Self {
        Self {
            depth: 0,
            limit: EQUAL_RECURSION_LIMIT,
        }
    }
}

impl EqualBudget {
    /// Budget left after the comparison; shrinks each time it was hit.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Heap {
    /// Top-level comparison: starts with a fresh budget.
    pub fn equal(&self, a: &Value, b: &Value, ignore_case: bool) -> bool {
        let mut budget = EqualBudget::default();
        self.equal_recursive(a, b, ignore_case, &mut budget)
    }

    /// Comparison continuing an enclosing one; the budget is shared.
    ///
    /// Values of different types are never equal here; the loose `==` of
    /// the language (Number against String) is the runtime's business.
    pub fn equal_recursive(&self, a: &Value, b: &Value, ignore_case: bool, budget: &mut EqualBudget) -> bool {
        if a.value_type() != b.value_type() {
            return false;
        }
        if budget.depth >= budget.limit {
            budget.limit = budget.limit.saturating_sub(1);
            return true;
        }
        match (a, b) {
            (Value::List(x), Value::List(y)) => {
                budget.depth += 1;
                let equal = self.list_equal(*x, *y, ignore_case, budget);
                budget.depth -= 1;
                equal
            }
            (Value::Dict(x), Value::Dict(y)) => {
                budget.depth += 1;
                let equal = self.dict_equal(*x, *y, ignore_case, budget);
                budget.depth -= 1;
                equal
            }
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y,
            (Value::String(x), Value::String(y)) => {
                if ignore_case {
                    x.to_lowercase() == y.to_lowercase()
                } else {
                    x == y
                }
            }
            (Value::Funcref(x), Value::Funcref(y)) => x == y,
            (Value::Special(x), Value::Special(y)) => x == y,
            (Value::Unknown, Value::Unknown) => true,
            _ => false,
        }
    }

    fn list_equal(&self, x: ListId, y: ListId, ignore_case: bool, budget: &mut EqualBudget) -> bool {
        if x == y {
            return true;
        }
        let (Ok(left), Ok(right)) = (self.list_values(x), self.list_values(y)) else {
            return false;
        };
        if left.len() != right.len() {
            return false;
        }
        for (a, b) in left.into_iter().zip(right) {
            if !self.equal_recursive(a, b, ignore_case, budget) {
                return false;
            }
        }
        true
    }

    fn dict_equal(&self, x: DictId, y: DictId, ignore_case: bool, budget: &mut EqualBudget) -> bool {
        if x == y {
            return true;
        }
        let (Ok(left), Ok(right)) = (self.dict_entries(x), self.dict_entries(y)) else {
            return false;
        };
        if left.len() != right.len() {
            return false;
        }
        for (key, a) in left {
            match right.get(key) {
                Some(b) if self.equal_recursive(a, b, ignore_case, budget) => {}
                _ => return false,
            }
        }
        true
    }
}
