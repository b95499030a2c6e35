mod common;

use allocvec::{Array, AssocArray, StringBuilder};
use common::FailAfter;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Push(i32),
    Pop,
    Insert(usize, i32),
    RemoveOrdered(usize),
    RemoveSwap(usize),
    RemoveRange(usize, usize),
    SetCapacity(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Push),
        1 => Just(Op::Pop),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        1 => any::<usize>().prop_map(Op::RemoveOrdered),
        1 => any::<usize>().prop_map(Op::RemoveSwap),
        1 => (any::<usize>(), 1usize..8).prop_map(|(s, n)| Op::RemoveRange(s, n)),
        1 => (0usize..40).prop_map(Op::SetCapacity),
    ]
}

proptest! {
    #[test]
    fn test_array_matches_vec_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut array: Array<i32> = Array::new(1).unwrap();
        let mut model: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                Op::Push(v) => {
                    array.push(v).unwrap();
                    model.push(v);
                }
                Op::Pop => {
                    prop_assert_eq!(array.pop().copied(), model.pop());
                }
                Op::Insert(i, v) => {
                    let i = i % (model.len() + 1);
                    array.insert(i, v).unwrap();
                    model.insert(i, v);
                }
                Op::RemoveOrdered(i) if !model.is_empty() => {
                    let i = i % model.len();
                    prop_assert_eq!(array.remove_ordered(i).unwrap(), model.remove(i));
                }
                Op::RemoveSwap(i) if !model.is_empty() => {
                    let i = i % model.len();
                    prop_assert_eq!(array.remove_swap(i).unwrap(), model.swap_remove(i));
                }
                Op::RemoveRange(s, n) if !model.is_empty() => {
                    let s = s % model.len();
                    let end = (s + n).min(model.len());
                    prop_assert_eq!(array.remove_range(s, n).unwrap(), end - s);
                    model.drain(s..end);
                }
                Op::SetCapacity(c) => {
                    array.set_capacity(c).unwrap();
                    model.truncate(c);
                    prop_assert_eq!(array.capacity(), c);
                }
                _ => {}
            }
            prop_assert!(array.len() <= array.capacity());
            prop_assert_eq!(array.as_slice(), model.as_slice());
        }
    }

    #[test]
    fn test_growth_never_corrupts(items in prop::collection::vec(any::<u64>(), 1..300)) {
        let mut array: Array<u64> = Array::new(0).unwrap();
        for (n, item) in items.iter().enumerate() {
            let before = array.capacity();
            array.push(*item).unwrap();
            if array.capacity() != before {
                prop_assert_eq!(array.as_slice(), &items[..=n]);
            }
        }
    }

    #[test]
    fn test_sort_orders_items(mut items in prop::collection::vec(any::<i16>(), 0..100)) {
        let mut array: Array<i16> = Array::with_comparer(0, i16::cmp).unwrap();
        array.extend_from_slice(&items).unwrap();
        array.sort().unwrap();
        items.sort_unstable();
        prop_assert_eq!(array.as_slice(), items.as_slice());
    }

    #[test]
    fn test_assoc_lengths_stay_equal_under_failure(
        budget in 2usize..12,
        entries in prop::collection::vec((0u8..20, any::<u16>()), 0..60),
    ) {
        let allocator = FailAfter::new(budget);
        let mut dict: AssocArray<u8, u16, _> = AssocArray::new_in(1, u8::cmp, &allocator).unwrap();
        let mut model = std::collections::BTreeMap::new();

        for (k, v) in entries {
            if dict.put(k, v).is_ok() {
                model.insert(k, v);
            }
            prop_assert_eq!(dict.keys().len(), dict.values().len());
            prop_assert_eq!(dict.len(), model.len());
        }
        for (k, v) in &model {
            prop_assert_eq!(dict.get(k), Some(v));
        }
    }

    #[test]
    fn test_string_concat_and_terminator(pieces in prop::collection::vec(".{0,12}", 0..30)) {
        let mut s = StringBuilder::new(0).unwrap();
        let mut model = String::new();
        for piece in &pieces {
            s.cat(piece.as_str()).unwrap();
            model.push_str(piece);
            prop_assert_eq!(s.as_bytes_with_nul()[s.len()], 0);
        }
        prop_assert_eq!(s.as_str(), model.as_str());
    }

    #[test]
    fn test_trim_matches_model(text in "[ \t\n\r\x0b\x0ca-z]{0,40}") {
        let mut s: StringBuilder = text.parse().unwrap();
        s.trim();
        let expected = text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'));
        prop_assert_eq!(s.as_str(), expected);
        prop_assert_eq!(s.as_bytes_with_nul()[s.len()], 0);
    }

    #[test]
    fn test_cat_fmt_matches_format(value in any::<f64>(), n in any::<i64>()) {
        let mut s = StringBuilder::new(0).unwrap();
        s.cat(value).unwrap();
        s.cat(n).unwrap();
        prop_assert_eq!(s.as_str(), format!("{value:.6}{n}"));
    }
}
