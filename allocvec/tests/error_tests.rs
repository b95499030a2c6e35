use allocvec::{Array, AssocArray, Buffer, Error, ErrorKind, StringBuilder};

#[test]
fn test_error_display() {
    let cases = [
        (
            Error::AllocationFailed { requested: 24 },
            "Allocation failed: requested 24 bytes",
        ),
        (
            Error::CapacityOverflow { count: 3 },
            "Capacity overflow: 3 items exceed the addressable size",
        ),
        (Error::EmptyArray, "Operation on empty array"),
        (
            Error::InvalidArgument {
                parameter: "count",
                value: 0,
            },
            "Invalid argument: count = 0",
        ),
        (Error::MissingComparer, "No comparer set for this array"),
        (Error::NotFound, "Not found"),
        (
            Error::NotCharBoundary { index: 4 },
            "Offset 4 is not on a character boundary",
        ),
        (Error::FormatFailed, "Formatting failed"),
    ];
    for (error, message) in cases {
        assert_eq!(error.to_string(), message);
    }
}

#[test]
fn test_error_is_std_error() {
    fn takes_std_error(_: &dyn std::error::Error) {}
    takes_std_error(&Error::NotFound);
}

#[test]
fn test_capacity_overflow_is_reported() {
    let mut array: Array<u64> = Array::new(0).unwrap();
    let err = array.set_capacity(usize::MAX).unwrap_err();
    assert_eq!(err, Error::CapacityOverflow { count: usize::MAX });
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(array.capacity(), 0);

    let err = array.reserve(usize::MAX).unwrap_err();
    assert!(matches!(err, Error::CapacityOverflow { .. }));
}

#[test]
fn test_huge_byte_size_is_rejected_not_allocated() {
    let mut array: Array<u8> = Array::new(0).unwrap();
    let err = array.set_capacity(usize::MAX).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(array.capacity(), 0);

    let mut buffer = Buffer::new();
    assert!(buffer.set_size(isize::MAX as usize + 1).is_err());
    assert!(buffer.is_empty());
}

#[test]
fn test_zero_counts_are_invalid() {
    let mut array: Array<u8> = Array::new(2).unwrap();
    array.push(1).unwrap();
    assert_eq!(
        array.insert_empty_run(0, 0).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        array.remove_range(0, 0).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn test_every_kind_has_a_distinct_nonzero_code() {
    let errors = [
        Error::MissingComparer,
        Error::AllocationFailed { requested: 1 },
        Error::EmptyArray,
        Error::InvalidArgument {
            parameter: "x",
            value: 1,
        },
        Error::NotFound,
    ];
    let mut codes: Vec<i32> = errors.iter().map(|e| e.kind().code()).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_lookup_failures_are_not_faults() {
    let dict: AssocArray<i32, i32> = AssocArray::new(0).unwrap();
    assert_eq!(dict.try_get(&0).unwrap_err().kind(), ErrorKind::NotFound);

    let s = StringBuilder::new(0).unwrap();
    assert_eq!(s.find("x"), None);
}
