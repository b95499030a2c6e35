//! `allocvec`: growable containers over a pluggable allocator.
//!
//! Four containers share one storage engine: a [`Buffer`] owns a single
//! reallocatable byte region, an [`Array`] types that region and manages
//! length and capacity, an [`AssocArray`] keeps two arrays in lockstep as a
//! small key-value store, and a [`StringBuilder`] keeps a NUL-terminated
//! UTF-8 string in a byte array.
//!
//! Every container takes its allocator as a type parameter, defaulting to
//! [`DefaultAllocator`]. The instance passed at construction is kept for the
//! container's lifetime, so resize and release always return memory to the
//! allocator that produced it. There is no global allocator state.
//!
//! All fallible operations return [`Result`]. Allocation failure is an
//! ordinary error: the container keeps its previous state and the caller
//! decides what to do.
//!
//! # Performance Characteristics
//!
//! ## Time Complexity
//! - `push()`: amortised O(1); growth doubles capacity plus a fixed reserve
//! - `get()`, `put()`, `pop()`, `remove_swap()`: O(1)
//! - `insert()`, `remove_ordered()`, `remove_range()`: O(n) tail shift
//! - `find()`: O(n) linear scan with the comparer
//! - `AssocArray` `put()`/`get()`/`remove()`: O(n), no hashing
//! - `clear()`: O(1), storage is kept for reuse
//!
//! ## Growth
//! When an operation needs more room, the new capacity is
//! `max(capacity * 2 + 4, required)`. Capacity never shrinks unless
//! `set_capacity()` is called.
//!
//! # Array and Stack Interface
//!
//! ```
//! # use allocvec::{Array, Error};
//! let mut array: Array<u32> = Array::with_comparer(1, u32::cmp).unwrap();
//!
//! array.push(30).unwrap();
//! array.push(10).unwrap();
//! array.push(20).unwrap();
//! assert_eq!(array.len(), 3);
//! assert!(array.capacity() >= 3);
//!
//! array.insert(0, 5).unwrap();
//! assert_eq!(array.as_slice(), &[5, 30, 10, 20]);
//!
//! array.sort().unwrap();
//! assert_eq!(array.find(&20).unwrap(), Some(2));
//!
//! assert_eq!(array.top(), Some(&30));
//! assert_eq!(array.pop(), Some(&30));
//!
//! // Safe variants for error handling
//! assert_eq!(array.try_get(10), Err(Error::IndexOutOfBounds { index: 10, length: 3 }));
//! ```
//!
//! # Dictionary Interface
//!
//! ```
//! # use allocvec::AssocArray;
//! let mut dict: AssocArray<i32, &str> = AssocArray::new(4).unwrap();
//!
//! dict.put(1, "one").unwrap();
//! dict.put(2, "two").unwrap();
//! dict.put(1, "uno").unwrap();   // replaces the value for key 1
//!
//! assert_eq!(dict.get(&1), Some(&"uno"));
//! assert_eq!(dict.len(), 2);
//!
//! for (key, value) in &dict {
//!     println!("{key} = {value}");
//! }
//! ```
//!
//! # String Builder
//!
//! ```
//! # use allocvec::{cat, StringBuilder};
//! let mut s = StringBuilder::new(4).unwrap();
//!
//! s.cat("ratio ").unwrap();
//! s.cat(2.5f64).unwrap();
//! cat!(s, " ({} digits)", 6).unwrap();
//! assert_eq!(s, "ratio 2.500000 (6 digits)");
//!
//! // Always NUL-terminated
//! assert_eq!(s.as_bytes_with_nul().last(), Some(&0));
//! ```
//!
//! # Custom Allocators
//!
//! Any type implementing [`Allocator`] can back a container. A reference to
//! an allocator is itself an allocator, so one instance can be shared:
//!
//! ```
//! # use allocvec::{Array, TrackingAllocator};
//! let tracker = TrackingAllocator::new();
//! {
//!     let mut array: Array<u64, _> = Array::new_in(2, None, &tracker).unwrap();
//!     for i in 0..100 {
//!         array.push(i).unwrap();
//!     }
//!     assert!(tracker.stats().reallocations > 0);
//! }
//! assert_eq!(tracker.stats().live_bytes, 0);
//! ```

pub mod alloc;
mod array;
mod assoc;
mod buffer;
pub mod config;
mod error;
mod iter;
mod string;

// Re-export public types and traits
pub use alloc::{AllocStats, Allocator, DefaultAllocator, FnAllocator, TrackingAllocator};
pub use array::{Array, Comparer};
pub use assoc::AssocArray;
pub use buffer::Buffer;
pub use config::{GrowthPolicy, DEFAULT_INITIAL_CAPACITY, GROWTH_RESERVE};
pub use error::{Error, ErrorKind, Result};
pub use iter::AssocIter;
pub use string::{Cat, StringBuilder};
