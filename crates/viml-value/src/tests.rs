//! Tests for the value model.

use pretty_assertions::assert_eq;

use crate::{EqualBudget, Heap, LegacyError, ListId, Value, ValueError};

fn list_id(value: &Value) -> ListId {
    match value {
        Value::List(id) => *id,
        other => panic!("expected a list, got {other:?}"),
    }
}

fn numbers(heap: &mut Heap, values: &[i64]) -> Value {
    heap.list_from(values.iter().map(|n| Value::Number(*n)))
        .expect("list")
}

#[test]
fn test_assignment_aliases() {
    let mut heap = Heap::new();
    let list = numbers(&mut heap, &[1, 2]);
    let alias = heap.alias(&list);
    assert_eq!(heap.refcount(&list), Some(2));

    heap.list_append(list_id(&alias), Value::Number(3)).expect("append");
    assert_eq!(heap.repr(&list).expect("repr"), "[1, 2, 3]");

    heap.release(alias);
    assert_eq!(heap.refcount(&list), Some(1));
}

#[test]
fn test_shallow_copy_shares_nested_containers() {
    let mut heap = Heap::new();
    let inner = numbers(&mut heap, &[1]);
    let inner_id = list_id(&inner);
    let outer = heap.list_from([inner]).expect("outer");

    let copy = heap.copy(&outer, false).expect("copy");
    assert_ne!(list_id(&copy), list_id(&outer));

    // Mutating the nested list through the copy shows through the original.
    let nested = list_id(heap.list_get(list_id(&copy), 0).expect("item"));
    assert_eq!(nested, inner_id);
    heap.list_append(nested, Value::Number(2)).expect("append");
    assert_eq!(heap.repr(&outer).expect("repr"), "[[1, 2]]");

    // The top level is independent.
    heap.list_append(list_id(&copy), Value::Number(9)).expect("append");
    assert_eq!(heap.repr(&outer).expect("repr"), "[[1, 2]]");
    assert_eq!(heap.refcount(&Value::List(inner_id)), Some(2));
}

#[test]
fn test_deep_copy_of_self_referential_list() {
    let mut heap = Heap::new();
    // l = [] | l[0] = l
    let list = heap.new_list();
    let id = list_id(&list);
    let alias = heap.alias(&list);
    heap.list_append(id, alias).expect("append");

    let copy = heap.copy(&list, true).expect("deep copy terminates");
    let copy_id = list_id(&copy);
    assert_ne!(copy_id, id);

    // The clone refers to itself, not to the original.
    assert_eq!(list_id(heap.list_get(copy_id, 0).expect("item")), copy_id);
    assert_eq!(heap.repr(&copy).expect("repr"), "[[...]]");

    heap.list_append(id, Value::Number(1)).expect("append");
    assert_eq!(heap.list_len(copy_id), Ok(1));
}

#[test]
fn test_deep_copy_preserves_sharing() {
    let mut heap = Heap::new();
    let shared = numbers(&mut heap, &[7]);
    let second = heap.alias(&shared);
    let outer = heap.list_from([shared, second]).expect("outer");

    let copy = heap.copy(&outer, true).expect("copy");
    let copy_id = list_id(&copy);
    let first = list_id(heap.list_get(copy_id, 0).expect("first"));
    let second = list_id(heap.list_get(copy_id, 1).expect("second"));
    assert_eq!(first, second);
    assert_ne!(first, list_id(heap.list_get(list_id(&outer), 0).expect("original")));
}

#[test]
fn test_deep_copy_depth_limit() {
    let mut heap = Heap::new();
    let mut value = heap.new_list();
    for _ in 0..150 {
        value = heap.list_from([value]).expect("wrap");
    }
    assert_eq!(heap.copy(&value, true), Err(ValueError::NestedTooDeep));
    assert_eq!(ValueError::NestedTooDeep.legacy(), LegacyError::NestedTooDeep);
}

#[test]
fn test_equal_is_type_strict_and_honors_case() {
    let mut heap = Heap::new();
    let a = heap
        .list_from([Value::Number(1), Value::from("abc")])
        .expect("a");
    let b = heap
        .list_from([Value::Number(1), Value::from("ABC")])
        .expect("b");
    assert!(!heap.equal(&a, &b, false));
    assert!(heap.equal(&a, &b, true));
    assert!(!heap.equal(&Value::Number(1), &Value::from("1"), false));
}

#[test]
fn test_equal_on_distinct_cycles_uses_budget() {
    fn self_list(heap: &mut Heap) -> Value {
        let list = heap.new_list();
        let alias = heap.alias(&list);
        heap.list_append(list_id(&list), alias).expect("append");
        list
    }

    // The comparison nests once per level until the budget runs out.
    let outcome = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let mut heap = Heap::new();
            let a = self_list(&mut heap);
            let b = self_list(&mut heap);
            let mut budget = EqualBudget::default();
            let equal = heap.equal_recursive(&a, &b, false, &mut budget);
            (equal, budget.limit())
        })
        .expect("spawn")
        .join()
        .expect("join");
    assert_eq!(outcome, (true, crate::EQUAL_RECURSION_LIMIT - 1));
}

#[test]
fn test_list_index_cache() {
    let mut heap = Heap::new();
    let list = numbers(&mut heap, &(0..10).collect::<Vec<_>>());
    let id = list_id(&list);

    assert_eq!(heap.list_get(id, 7), Ok(&Value::Number(7)));
    assert_eq!(heap.cached_index(id), Some(7));
    assert_eq!(heap.list_get(id, 8), Ok(&Value::Number(8)));
    assert_eq!(heap.cached_index(id), Some(8));
    assert_eq!(heap.list_get(id, -10), Ok(&Value::Number(0)));
    assert_eq!(heap.cached_index(id), Some(0));

    let removed = heap.list_remove(id, 3).expect("remove");
    assert_eq!(removed, Value::Number(3));
    assert_eq!(heap.cached_index(id), None);
    assert_eq!(heap.list_get(id, 3), Ok(&Value::Number(4)));
    assert_eq!(heap.list_get(id, 9), Err(ValueError::IndexOutOfRange(9)));
}

#[test]
fn test_list_insert() {
    let mut heap = Heap::new();
    let list = numbers(&mut heap, &[1, 3]);
    let id = list_id(&list);
    heap.list_insert(id, 1, Value::Number(2)).expect("insert");
    heap.list_insert(id, 0, Value::Number(0)).expect("insert");
    heap.list_insert(id, 4, Value::Number(4)).expect("insert");
    assert_eq!(heap.repr(&list).expect("repr"), "[0, 1, 2, 3, 4]");
}

#[test]
fn test_release_frees_recursively() {
    let mut heap = Heap::new();
    let dict = heap.new_dict();
    let Value::Dict(dict_id) = &dict else {
        panic!("dict");
    };
    let dict_id = *dict_id;
    let inner = numbers(&mut heap, &[1]);
    heap.dict_insert(dict_id, "inner", inner).expect("insert");
    let outer = heap.list_from([dict]).expect("outer");

    assert_eq!((heap.live_lists(), heap.live_dicts()), (2, 1));
    heap.release(outer);
    assert_eq!((heap.live_lists(), heap.live_dicts()), (0, 0));
}

#[test]
fn test_collect_cycles_frees_unreachable_cycles() {
    let mut heap = Heap::new();
    let root = heap.new_list();
    let cycle = heap.new_list();
    let cycle_alias = heap.alias(&cycle);
    heap.list_append(list_id(&cycle), cycle_alias).expect("append");
    let root_alias = heap.alias(&root);
    heap.list_append(list_id(&cycle), root_alias).expect("append");

    heap.release(cycle);
    assert_eq!(heap.live_lists(), 2);
    assert_eq!(heap.refcount(&root), Some(2));

    assert_eq!(heap.collect_cycles(&[&root]), 1);
    assert_eq!(heap.live_lists(), 1);
    assert_eq!(heap.refcount(&root), Some(1));
}

#[test]
fn test_free_without_recursion_leaves_items_alone() {
    let mut heap = Heap::new();
    let inner = numbers(&mut heap, &[1]);
    let inner_alias = heap.alias(&inner);
    let outer = heap.list_from([inner_alias]).expect("outer");

    heap.free_list(list_id(&outer), false);
    assert!(!heap.is_live(&outer));
    assert_eq!(heap.refcount(&inner), Some(2));
}

#[test]
fn test_conversions() {
    let mut heap = Heap::new();
    assert_eq!(heap.to_number(&Value::from("0x1f")), Ok(31));
    assert_eq!(heap.to_number(&Value::from("12abc")), Ok(12));
    assert_eq!(heap.to_number(&Value::from(true)), Ok(1));
    assert_eq!(
        heap.to_number(&Value::Float(1.5)),
        Err(ValueError::Conversion(LegacyError::FloatAsNumber))
    );
    let list = heap.new_list();
    assert_eq!(
        heap.to_text(&list),
        Err(ValueError::Conversion(LegacyError::ListAsString))
    );
    assert_eq!(heap.to_text(&Value::Number(-4)), Ok("-4".to_string()));
    assert!(!heap.truthy(&Value::from("abc")).expect("truthy"));
}

#[test]
fn test_repr() {
    let mut heap = Heap::new();
    let dict = heap.new_dict();
    let Value::Dict(id) = &dict else {
        panic!("dict");
    };
    let id = *id;
    heap.dict_insert(id, "b", Value::Float(1.0)).expect("insert");
    heap.dict_insert(id, "a", Value::from("it's")).expect("insert");
    heap.dict_insert(id, "f", Value::funcref("Foo")).expect("insert");
    assert_eq!(
        heap.repr(&dict).expect("repr"),
        "{'a': 'it''s', 'b': 1.0, 'f': function('Foo')}"
    );
    assert_eq!(crate::format_float(1e20), "1.0e20");
}
