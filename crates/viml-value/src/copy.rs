//! Shallow and deep copies.

use std::collections::HashMap;

use crate::errors::ValueError;
use crate::heap::{DictId, Heap, ListId};
use crate::value::Value;

/// Nesting depth at which a deep copy gives up.
pub const MAX_COPY_DEPTH: usize = 100;

/// Containers already copied during one top-level deep copy, keyed by the
/// source handle.
#[derive(Debug, Default)]
struct CopyMap {
    lists: HashMap<ListId, ListId>,
    dicts: HashMap<DictId, DictId>,
}

impl Heap {
    /// Copy a value.
    ///
    /// A shallow copy builds a new top-level container whose items alias the
    /// original items. A deep copy clones every nested container; a container
    /// reached twice within the same call is cloned once and aliased after
    /// that, which keeps shared and self-referential structure intact.
    pub fn copy(&mut self, value: &Value, deep: bool) -> Result<Value, ValueError> {
        if deep {
            let mut seen = CopyMap::default();
            self.deep_copy(value, &mut seen, 0)
        } else {
            self.shallow_copy(value)
        }
    }

    fn shallow_copy(&mut self, value: &Value) -> Result<Value, ValueError> {
        match value {
            Value::List(id) => {
                let items = self.list_item_ids(*id)?;
                let copy = self.alloc_list();
                for item in items {
                    let alias = self.item_value(item)?.dup();
                    self.retain(&alias);
                    self.list_append(copy, alias)?;
                }
                Ok(Value::List(copy))
            }
            Value::Dict(id) => {
                let entries: Vec<_> = self
                    .dict_entries(*id)?
                    .iter()
                    .map(|(key, value)| (key.clone(), value.dup()))
                    .collect();
                let copy = self.alloc_dict();
                for (key, alias) in entries {
                    self.retain(&alias);
                    self.dict_insert(copy, &key, alias)?;
                }
                Ok(Value::Dict(copy))
            }
            scalar => Ok(scalar.dup()),
        }
    }

    fn deep_copy(&mut self, value: &Value, seen: &mut CopyMap, depth: usize) -> Result<Value, ValueError> {
        if depth >= MAX_COPY_DEPTH {
            return Err(ValueError::NestedTooDeep);
        }
        match value {
            Value::List(id) => {
                if let Some(copy) = seen.lists.get(id) {
                    let alias = Value::List(*copy);
                    self.retain(&alias);
                    return Ok(alias);
                }
                let copy = self.alloc_list();
                seen.lists.insert(*id, copy);
                if let Err(err) = self.deep_copy_items(*id, copy, seen, depth) {
                    self.release(Value::List(copy));
                    return Err(err);
                }
                Ok(Value::List(copy))
            }
            Value::Dict(id) => {
                if let Some(copy) = seen.dicts.get(id) {
                    let alias = Value::Dict(*copy);
                    self.retain(&alias);
                    return Ok(alias);
                }
                let copy = self.alloc_dict();
                seen.dicts.insert(*id, copy);
                if let Err(err) = self.deep_copy_entries(*id, copy, seen, depth) {
                    self.release(Value::Dict(copy));
                    return Err(err);
                }
                Ok(Value::Dict(copy))
            }
            scalar => Ok(scalar.dup()),
        }
    }

    fn deep_copy_items(
        &mut self,
        source: ListId,
        copy: ListId,
        seen: &mut CopyMap,
        depth: usize,
    ) -> Result<(), ValueError> {
        for item in self.list_item_ids(source)? {
            let original = self.item_value(item)?.dup();
            let cloned = self.deep_copy(&original, seen, depth + 1)?;
            self.list_append(copy, cloned)?;
        }
        Ok(())
    }

    fn deep_copy_entries(
        &mut self,
        source: DictId,
        copy: DictId,
        seen: &mut CopyMap,
        depth: usize,
    ) -> Result<(), ValueError> {
        let entries: Vec<_> = self
            .dict_entries(source)?
            .iter()
            .map(|(key, value)| (key.clone(), value.dup()))
            .collect();
        for (key, original) in entries {
            let cloned = self.deep_copy(&original, seen, depth + 1)?;
            self.dict_insert(copy, &key, cloned)?;
        }
        Ok(())
    }
}
