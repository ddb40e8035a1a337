//! Arena of reference-counted lists and dictionaries.
//!
//! Containers are addressed by handle. A list is a doubly-linked chain of
//! items stored in the same arena, with a cache of the last index looked up
//! so that sequential access stays cheap.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::ValueError;
use crate::value::Value;

/// Handle of a list in a [`Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(usize);

/// Handle of a dictionary in a [`Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DictId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ItemId(usize);

#[derive(Debug)]
struct Slots<T> {
    entries: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Slots<T> {
    fn insert(&mut self, value: T) -> usize {
        if let Some(index) = self.free.pop() {
            self.entries[index] = Some(value);
            index
        } else {
            self.entries.push(Some(value));
            self.entries.len() - 1
        }
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).and_then(Option::as_mut)
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        let taken = self.entries.get_mut(index).and_then(Option::take);
        if taken.is_some() {
            self.free.push(index);
        }
        taken
    }

    fn live(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    fn indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.as_ref().map(|_| index))
            .collect()
    }
}

#[derive(Debug)]
pub(crate) struct ListItem {
    pub(crate) value: Value,
    prev: Option<ItemId>,
    next: Option<ItemId>,
}

#[derive(Debug)]
pub(crate) struct ListData {
    refcount: usize,
    first: Option<ItemId>,
    last: Option<ItemId>,
    len: usize,
    /// Last `(index, item)` found by [`Heap::find_item`].
    cache: Cell<Option<(usize, ItemId)>>,
}

#[derive(Debug)]
pub(crate) struct DictData {
    refcount: usize,
    pub(crate) entries: HashMap<Rc<str>, Value>,
}

/// Owner of every list and dictionary reachable from [`Value`]s.
#[derive(Debug, Default)]
pub struct Heap {
    lists: Slots<ListData>,
    dicts: Slots<DictData>,
    items: Slots<ListItem>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Reference counting
    // ------------------------------------------------------------------

    pub(crate) fn alloc_list(&mut self) -> ListId {
        ListId(self.lists.insert(ListData {
            refcount: 1,
            first: None,
            last: None,
            len: 0,
            cache: Cell::new(None),
        }))
    }

    pub(crate) fn alloc_dict(&mut self) -> DictId {
        DictId(self.dicts.insert(DictData {
            refcount: 1,
            entries: HashMap::new(),
        }))
    }

    /// A new empty list, owned by the returned value.
    pub fn new_list(&mut self) -> Value {
        Value::List(self.alloc_list())
    }

    /// A new empty dictionary, owned by the returned value.
    pub fn new_dict(&mut self) -> Value {
        Value::Dict(self.alloc_dict())
    }

    /// A new list taking ownership of `values`.
    pub fn list_from(&mut self, values: impl IntoIterator<Item = Value>) -> Result<Value, ValueError> {
        let id = self.alloc_list();
        for value in values {
            self.list_append(id, value)?;
        }
        Ok(Value::List(id))
    }

    /// Another reference to the same value. Containers get their count
    /// bumped; nothing is copied.
    pub fn alias(&mut self, value: &Value) -> Value {
        let alias = value.dup();
        self.retain(&alias);
        alias
    }

    pub(crate) fn retain(&mut self, value: &Value) {
        match value {
            Value::List(id) => {
                if let Some(list) = self.lists.get_mut(id.0) {
                    list.refcount += 1;
                }
            }
            Value::Dict(id) => {
                if let Some(dict) = self.dicts.get_mut(id.0) {
                    dict.refcount += 1;
                }
            }
            _ => {}
        }
    }

    /// Drop one reference. A container whose count reaches zero is freed
    /// together with its contents.
    pub fn release(&mut self, value: Value) {
        match value {
            Value::List(id) => {
                let Some(list) = self.lists.get_mut(id.0) else {
                    return;
                };
                list.refcount = list.refcount.saturating_sub(1);
                if list.refcount == 0 {
                    self.free_list(id, true);
                }
            }
            Value::Dict(id) => {
                let Some(dict) = self.dicts.get_mut(id.0) else {
                    return;
                };
                dict.refcount = dict.refcount.saturating_sub(1);
                if dict.refcount == 0 {
                    self.free_dict(id, true);
                }
            }
            _ => {}
        }
    }

    /// Current reference count of a container value.
    pub fn refcount(&self, value: &Value) -> Option<usize> {
        match value {
            Value::List(id) => self.lists.get(id.0).map(|list| list.refcount),
            Value::Dict(id) => self.dicts.get(id.0).map(|dict| dict.refcount),
            _ => None,
        }
    }

    /// Free a list regardless of its reference count.
    ///
    /// With `recurse` unset the items are dropped without releasing the
    /// containers they reference; the caller is then responsible for those.
    /// The list leaves the arena before its items are visited, so an item
    /// referring back to it finds nothing to release.
    pub fn free_list(&mut self, id: ListId, recurse: bool) {
        let Some(list) = self.lists.remove(id.0) else {
            return;
        };
        let mut cursor = list.first;
        while let Some(item_id) = cursor {
            let Some(item) = self.items.remove(item_id.0) else {
                break;
            };
            cursor = item.next;
            if recurse {
                self.release(item.value);
            }
        }
    }

    /// Free a dictionary regardless of its reference count. See
    /// [`Heap::free_list`] for `recurse`.
    pub fn free_dict(&mut self, id: DictId, recurse: bool) {
        let Some(dict) = self.dicts.remove(id.0) else {
            return;
        };
        if recurse {
            for (_, value) in dict.entries {
                self.release(value);
            }
        }
    }

    pub fn live_lists(&self) -> usize {
        self.lists.live()
    }

    pub fn live_dicts(&self) -> usize {
        self.dicts.live()
    }

    pub fn is_live(&self, value: &Value) -> bool {
        self.refcount(value).is_some()
    }

    pub(crate) fn list_ids(&self) -> Vec<ListId> {
        self.lists.indices().into_iter().map(ListId).collect()
    }

    pub(crate) fn dict_ids(&self) -> Vec<DictId> {
        self.dicts.indices().into_iter().map(DictId).collect()
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    fn list(&self, id: ListId) -> Result<&ListData, ValueError> {
        self.lists.get(id.0).ok_or(ValueError::FreedList(id))
    }

    fn list_mut(&mut self, id: ListId) -> Result<&mut ListData, ValueError> {
        self.lists.get_mut(id.0).ok_or(ValueError::FreedList(id))
    }

    fn item(&self, id: ItemId) -> Result<&ListItem, ValueError> {
        self.items
            .get(id.0)
            .ok_or(ValueError::Conversion(crate::LegacyError::Internal))
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut ListItem, ValueError> {
        self.items
            .get_mut(id.0)
            .ok_or(ValueError::Conversion(crate::LegacyError::Internal))
    }

    pub fn list_len(&self, id: ListId) -> Result<usize, ValueError> {
        Ok(self.list(id)?.len)
    }

    /// Append, taking ownership of `value`. The index cache stays valid.
    pub fn list_append(&mut self, id: ListId, value: Value) -> Result<(), ValueError> {
        let last = self.list(id)?.last;
        let item = ItemId(self.items.insert(ListItem {
            value,
            prev: last,
            next: None,
        }));
        if let Some(last) = last {
            self.item_mut(last)?.next = Some(item);
        }
        let list = self.list_mut(id)?;
        if list.first.is_none() {
            list.first = Some(item);
        }
        list.last = Some(item);
        list.len += 1;
        Ok(())
    }

    /// Insert before `index`; `index == len` appends.
    pub fn list_insert(&mut self, id: ListId, index: i64, value: Value) -> Result<(), ValueError> {
        let len = self.list(id)?.len;
        if usize::try_from(index).is_ok_and(|index| index == len) {
            return self.list_append(id, value);
        }
        let before = self
            .find_item(id, index)?
            .ok_or(ValueError::IndexOutOfRange(index))?;
        let prev = self.item(before)?.prev;
        let item = ItemId(self.items.insert(ListItem {
            value,
            prev,
            next: Some(before),
        }));
        self.item_mut(before)?.prev = Some(item);
        match prev {
            Some(prev) => self.item_mut(prev)?.next = Some(item),
            None => self.list_mut(id)?.first = Some(item),
        }
        let list = self.list_mut(id)?;
        list.len += 1;
        list.cache.set(None);
        Ok(())
    }

    /// Item at `index`; negative indexes count from the end.
    pub fn list_get(&self, id: ListId, index: i64) -> Result<&Value, ValueError> {
        let item = self
            .find_item(id, index)?
            .ok_or(ValueError::IndexOutOfRange(index))?;
        Ok(&self.item(item)?.value)
    }

    /// Replace the item at `index`, releasing the previous value.
    pub fn list_set(&mut self, id: ListId, index: i64, value: Value) -> Result<(), ValueError> {
        let item = self
            .find_item(id, index)?
            .ok_or(ValueError::IndexOutOfRange(index))?;
        let old = std::mem::replace(&mut self.item_mut(item)?.value, value);
        self.release(old);
        Ok(())
    }

    /// Unlink the item at `index` and hand its value to the caller.
    pub fn list_remove(&mut self, id: ListId, index: i64) -> Result<Value, ValueError> {
        let item_id = self
            .find_item(id, index)?
            .ok_or(ValueError::IndexOutOfRange(index))?;
        let item = self
            .items
            .remove(item_id.0)
            .ok_or(ValueError::Conversion(crate::LegacyError::Internal))?;
        match item.prev {
            Some(prev) => self.item_mut(prev)?.next = item.next,
            None => self.list_mut(id)?.first = item.next,
        }
        match item.next {
            Some(next) => self.item_mut(next)?.prev = item.prev,
            None => self.list_mut(id)?.last = item.prev,
        }
        let list = self.list_mut(id)?;
        list.len -= 1;
        list.cache.set(None);
        Ok(item.value)
    }

    /// Borrow every item in order.
    pub fn list_values(&self, id: ListId) -> Result<Vec<&Value>, ValueError> {
        let mut values = Vec::with_capacity(self.list(id)?.len);
        let mut cursor = self.list(id)?.first;
        while let Some(item_id) = cursor {
            let item = self.item(item_id)?;
            values.push(&item.value);
            cursor = item.next;
        }
        Ok(values)
    }

    pub(crate) fn list_item_ids(&self, id: ListId) -> Result<Vec<ItemId>, ValueError> {
        let mut ids = Vec::with_capacity(self.list(id)?.len);
        let mut cursor = self.list(id)?.first;
        while let Some(item_id) = cursor {
            ids.push(item_id);
            cursor = self.item(item_id)?.next;
        }
        Ok(ids)
    }

    pub(crate) fn item_value(&self, id: ItemId) -> Result<&Value, ValueError> {
        Ok(&self.item(id)?.value)
    }

    /// Index remembered by the last lookup, if any.
    pub fn cached_index(&self, id: ListId) -> Option<usize> {
        self.lists
            .get(id.0)
            .and_then(|list| list.cache.get())
            .map(|(index, _)| index)
    }

    /// Locate the item at `index`, walking from whichever of the first
    /// item, the cached item and the last item is closest.
    pub(crate) fn find_item(&self, id: ListId, index: i64) -> Result<Option<ItemId>, ValueError> {
        let list = self.list(id)?;
        let len = list.len as i64;
        let wanted = if index < 0 { len + index } else { index };
        if wanted < 0 || wanted >= len {
            return Ok(None);
        }
        let wanted = wanted as usize;

        let (Some(first), Some(last)) = (list.first, list.last) else {
            return Ok(None);
        };

        let (mut at, mut item) = match list.cache.get() {
            Some((cached, _)) if wanted < cached / 2 => (0, first),
            Some((cached, _)) if wanted > (cached + list.len) / 2 => (list.len - 1, last),
            Some((cached, cached_item)) => (cached, cached_item),
            None if wanted < list.len / 2 => (0, first),
            None => (list.len - 1, last),
        };

        while at < wanted {
            item = self.item(item)?.next.ok_or(ValueError::IndexOutOfRange(index))?;
            at += 1;
        }
        while at > wanted {
            item = self.item(item)?.prev.ok_or(ValueError::IndexOutOfRange(index))?;
            at -= 1;
        }

        list.cache.set(Some((at, item)));
        Ok(Some(item))
    }

    // ------------------------------------------------------------------
    // Dictionaries
    // ------------------------------------------------------------------

    fn dict(&self, id: DictId) -> Result<&DictData, ValueError> {
        self.dicts.get(id.0).ok_or(ValueError::FreedDict(id))
    }

    fn dict_mut(&mut self, id: DictId) -> Result<&mut DictData, ValueError> {
        self.dicts.get_mut(id.0).ok_or(ValueError::FreedDict(id))
    }

    pub fn dict_len(&self, id: DictId) -> Result<usize, ValueError> {
        Ok(self.dict(id)?.entries.len())
    }

    /// Insert or replace, taking ownership of `value` and releasing any
    /// value previously stored under `key`.
    pub fn dict_insert(&mut self, id: DictId, key: &str, value: Value) -> Result<(), ValueError> {
        let old = self.dict_mut(id)?.entries.insert(Rc::from(key), value);
        if let Some(old) = old {
            self.release(old);
        }
        Ok(())
    }

    pub fn dict_get(&self, id: DictId, key: &str) -> Result<&Value, ValueError> {
        self.dict(id)?
            .entries
            .get(key)
            .ok_or_else(|| ValueError::KeyNotPresent(key.to_string()))
    }

    pub fn dict_contains(&self, id: DictId, key: &str) -> Result<bool, ValueError> {
        Ok(self.dict(id)?.entries.contains_key(key))
    }

    /// Remove `key` and hand its value to the caller.
    pub fn dict_remove(&mut self, id: DictId, key: &str) -> Result<Value, ValueError> {
        self.dict_mut(id)?
            .entries
            .remove(key)
            .ok_or_else(|| ValueError::KeyNotPresent(key.to_string()))
    }

    /// Keys in sorted order.
    pub fn dict_keys(&self, id: DictId) -> Result<Vec<Rc<str>>, ValueError> {
        let mut keys: Vec<Rc<str>> = self.dict(id)?.entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    pub(crate) fn dict_entries(&self, id: DictId) -> Result<&HashMap<Rc<str>, Value>, ValueError> {
        Ok(&self.dict(id)?.entries)
    }

    pub(crate) fn take_list(&mut self, id: ListId) -> Vec<Value> {
        let mut values = Vec::new();
        let Some(list) = self.lists.remove(id.0) else {
            return values;
        };
        let mut cursor = list.first;
        while let Some(item_id) = cursor {
            let Some(item) = self.items.remove(item_id.0) else {
                break;
            };
            cursor = item.next;
            values.push(item.value);
        }
        values
    }

    pub(crate) fn take_dict(&mut self, id: DictId) -> Vec<Value> {
        self.dicts
            .remove(id.0)
            .map(|dict| dict.entries.into_values().collect())
            .unwrap_or_default()
    }
}
