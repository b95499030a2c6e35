use allocvec::{AssocArray, Error, ErrorKind};

#[test]
fn test_put_get_update() {
    let mut dict: AssocArray<i32, &str> = AssocArray::new(1).unwrap();
    dict.put(1, "one").unwrap();
    dict.put(2, "two").unwrap();
    dict.put(1, "uno").unwrap();

    assert_eq!(dict.get(&1), Some(&"uno"));
    assert_eq!(dict.get(&2), Some(&"two"));
    assert_eq!(dict.len(), 2);
}

#[test]
fn test_absent_key_is_not_found() {
    let dict: AssocArray<u32, u32> = AssocArray::new(2).unwrap();
    assert_eq!(dict.get(&7), None);
    let err = dict.try_get(&7).unwrap_err();
    assert_eq!(err, Error::NotFound);
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.kind().code(), 5);
}

#[test]
fn test_has() {
    let mut dict: AssocArray<char, bool> = AssocArray::new(2).unwrap();
    dict.put('x', true).unwrap();
    assert!(dict.has(&'x'));
    assert!(!dict.has(&'y'));
}

#[test]
fn test_remove_swap_reorders_but_keeps_pairs() {
    let mut dict: AssocArray<u8, u16> = AssocArray::new(4).unwrap();
    for k in 1..=4u8 {
        dict.put(k, u16::from(k) * 100).unwrap();
    }

    assert_eq!(dict.remove(&1), Some(100));
    assert_eq!(dict.keys(), &[4, 2, 3]);
    for (k, v) in dict.iter() {
        assert_eq!(u16::from(*k) * 100, *v);
    }
}

#[test]
fn test_remove_ordered_keeps_insertion_order() {
    let mut dict: AssocArray<u8, u16> = AssocArray::new(4).unwrap();
    for k in 1..=4u8 {
        dict.put(k, u16::from(k)).unwrap();
    }
    assert_eq!(dict.remove_ordered(&2), Some(2));
    assert_eq!(dict.keys(), &[1, 3, 4]);
    assert_eq!(dict.values(), &[1, 3, 4]);
    assert_eq!(dict.remove_ordered(&2), None);
}

#[test]
fn test_clear_then_reuse() {
    let mut dict: AssocArray<i32, i32> = AssocArray::new(2).unwrap();
    dict.put(1, 1).unwrap();
    dict.put(2, 2).unwrap();
    dict.clear();
    assert!(dict.is_empty());
    assert_eq!(dict.get(&1), None);

    dict.put(3, 30).unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.get(&3), Some(&30));
}

#[test]
fn test_grows_past_initial_capacity() {
    let mut dict: AssocArray<u32, u64> = AssocArray::new(0).unwrap();
    for k in 0..100u32 {
        dict.put(k, u64::from(k) * u64::from(k)).unwrap();
    }
    assert_eq!(dict.len(), 100);
    assert!(dict.capacity() >= 100);
    assert_eq!(dict.get(&9), Some(&81));
    assert_eq!(dict.get(&99), Some(&9801));
}

#[test]
fn test_shrinking_capacity_drops_trailing_entries() {
    let mut dict: AssocArray<u8, u8> = AssocArray::new(4).unwrap();
    for k in 0..4 {
        dict.put(k, k + 10).unwrap();
    }
    dict.set_capacity(2).unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.keys(), &[0, 1]);
    assert_eq!(dict.values(), &[10, 11]);
    assert!(!dict.has(&3));
}

#[test]
fn test_string_keys_with_comparer() {
    let mut dict: AssocArray<&str, i32> = AssocArray::new(2).unwrap();
    dict.put("beta", 2).unwrap();
    dict.put("alpha", 1).unwrap();
    dict.sort_by_key();
    assert_eq!(dict.keys(), &["alpha", "beta"]);
    assert_eq!(dict.values(), &[1, 2]);
}

#[test]
fn test_debug_is_a_map() {
    let mut dict: AssocArray<i32, char> = AssocArray::new(2).unwrap();
    dict.put(1, 'a').unwrap();
    dict.put(2, 'b').unwrap();
    assert_eq!(format!("{dict:?}"), "{1: 'a', 2: 'b'}");
}
