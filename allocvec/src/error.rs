use thiserror::Error;

/// Result alias used by every fallible container operation.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for buffer, array, assoc array and string builder operations
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// The allocator returned no memory
    #[error("Allocation failed: requested {requested} bytes")]
    AllocationFailed {
        /// Number of bytes requested from the allocator
        requested: usize,
    },
    /// The requested number of items does not fit in a valid allocation layout
    #[error("Capacity overflow: {count} items exceed the addressable size")]
    CapacityOverflow {
        /// Requested number of items
        count: usize,
    },
    /// Index is beyond the current length
    #[error("Index out of bounds: index {index} is beyond length {length}")]
    IndexOutOfBounds {
        /// Index that was accessed
        index: usize,
        /// Current length of the container
        length: usize,
    },
    /// Operation needs at least one element
    #[error("Operation on empty array")]
    EmptyArray,
    /// A size, count or alignment argument was rejected
    #[error("Invalid argument: {parameter} = {value}")]
    InvalidArgument {
        /// Name of the rejected parameter
        parameter: &'static str,
        /// Provided value
        value: usize,
    },
    /// `find` or `sort` was called on an array without a comparer
    #[error("No comparer set for this array")]
    MissingComparer,
    /// Lookup did not match any element
    #[error("Not found")]
    NotFound,
    /// A string offset falls inside a UTF-8 sequence
    #[error("Offset {index} is not on a character boundary")]
    NotCharBoundary {
        /// Offending byte offset
        index: usize,
    },
    /// A `Display` implementation reported an error or changed its output between passes
    #[error("Formatting failed")]
    FormatFailed,
}

/// Stable error taxonomy callers can branch on.
///
/// The numeric codes never change between releases; `0` is reserved for
/// success and is never produced.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(i32)]
pub enum ErrorKind {
    NullReference = 1,
    AllocationFailed = 2,
    OutOfBounds = 3,
    InvalidArgument = 4,
    NotFound = 5,
}

impl ErrorKind {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AllocationFailed { .. } => ErrorKind::AllocationFailed,
            Error::IndexOutOfBounds { .. } | Error::EmptyArray => ErrorKind::OutOfBounds,
            Error::CapacityOverflow { .. }
            | Error::InvalidArgument { .. }
            | Error::NotCharBoundary { .. }
            | Error::FormatFailed => ErrorKind::InvalidArgument,
            Error::MissingComparer => ErrorKind::NullReference,
            Error::NotFound => ErrorKind::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            Error::AllocationFailed { requested: 8 }.kind(),
            ErrorKind::AllocationFailed
        );
        assert_eq!(Error::EmptyArray.kind(), ErrorKind::OutOfBounds);
        assert_eq!(Error::MissingComparer.kind(), ErrorKind::NullReference);
        assert_eq!(Error::NotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::CapacityOverflow { count: usize::MAX }.kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_codes_are_stable_and_nonzero() {
        let kinds = [
            ErrorKind::NullReference,
            ErrorKind::AllocationFailed,
            ErrorKind::OutOfBounds,
            ErrorKind::InvalidArgument,
            ErrorKind::NotFound,
        ];
        let codes: Vec<i32> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_display_messages() {
        let err = Error::IndexOutOfBounds {
            index: 5,
            length: 1,
        };
        assert_eq!(
            err.to_string(),
            "Index out of bounds: index 5 is beyond length 1"
        );
        assert_eq!(
            Error::AllocationFailed { requested: 64 }.to_string(),
            "Allocation failed: requested 64 bytes"
        );
    }
}
