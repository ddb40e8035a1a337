//! Cycle collection.
//!
//! Reference counting never frees a container that refers to itself. A
//! collection pass marks everything reachable from the given roots and frees
//! the rest.

use std::collections::HashSet;

use tracing::debug;

use crate::heap::{DictId, Heap, ListId};
use crate::value::Value;

impl Heap {
    /// Free every container not reachable from `roots`. Returns the number
    /// of containers freed.
    pub fn collect_cycles(&mut self, roots: &[&Value]) -> usize {
        let (lists, dicts) = self.mark(roots);

        let dead_lists: Vec<ListId> = self
            .list_ids()
            .into_iter()
            .filter(|id| !lists.contains(id))
            .collect();
        let dead_dicts: Vec<DictId> = self
            .dict_ids()
            .into_iter()
            .filter(|id| !dicts.contains(id))
            .collect();

        // Detach everything first; references between dead containers are
        // dropped with them and only references into live ones are released.
        let mut contents = Vec::new();
        for id in &dead_lists {
            contents.extend(self.take_list(*id));
        }
        for id in &dead_dicts {
            contents.extend(self.take_dict(*id));
        }
        for value in contents {
            let live = match &value {
                Value::List(id) => lists.contains(id),
                Value::Dict(id) => dicts.contains(id),
                _ => false,
            };
            if live {
                self.release(value);
            }
        }

        let freed = dead_lists.len() + dead_dicts.len();
        debug!(freed, "collected unreachable containers");
        freed
    }

    fn mark(&self, roots: &[&Value]) -> (HashSet<ListId>, HashSet<DictId>) {
        let mut lists = HashSet::new();
        let mut dicts = HashSet::new();
        let mut pending: Vec<&Value> = roots.to_vec();
        while let Some(value) = pending.pop() {
            match value {
                Value::List(id) => {
                    if lists.insert(*id) {
                        if let Ok(items) = self.list_values(*id) {
                            pending.extend(items);
                        }
                    }
                }
                Value::Dict(id) => {
                    if dicts.insert(*id) {
                        if let Ok(entries) = self.dict_entries(*id) {
                            pending.extend(entries.values());
                        }
                    }
                }
                _ => {}
            }
        }
        (lists, dicts)
    }
}
