use core::ffi::CStr;
use core::fmt;
use core::str::FromStr;

use crate::alloc::{Allocator, DefaultAllocator};
use crate::array::Array;
use crate::config::DEFAULT_INITIAL_CAPACITY;
use crate::error::{Error, Result};

/// A growable UTF-8 string that is always NUL-terminated.
///
/// The terminator is stored as the last byte of the backing array, so the
/// contents can be handed to C as a `&CStr` at any time without copying.
pub struct StringBuilder<A: Allocator = DefaultAllocator> {
    storage: Array<u8, A>,
}

impl StringBuilder<DefaultAllocator> {
    /// Creates an empty string with room for `capacity` bytes plus the terminator.
    ///
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` if the storage cannot be obtained.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::new_in(capacity, DefaultAllocator)
    }

    /// Creates an empty string with the default capacity (8 bytes).
    ///
    /// # Errors
    ///
    /// See [`StringBuilder::new`].
    pub fn with_default_capacity() -> Result<Self> {
        Self::new(DEFAULT_INITIAL_CAPACITY)
    }
}

impl<A: Allocator> StringBuilder<A> {
    /// Creates an empty string whose storage comes from `alloc`.
    ///
    /// # Errors
    ///
    /// - `Error::CapacityOverflow` if `capacity + 1` overflows
    /// - `Error::AllocationFailed` if the storage cannot be obtained
    pub fn new_in(capacity: usize, alloc: A) -> Result<Self> {
        let total = capacity
            .checked_add(1)
            .ok_or(Error::CapacityOverflow { count: capacity })?;
        let mut storage = Array::new_in(total, None, alloc)?;
        storage.push(0)?;
        Ok(Self { storage })
    }

    /// Creates a string holding a copy of `s`, sized to fit it exactly.
    ///
    /// # Errors
    ///
    /// See [`StringBuilder::new_in`].
    pub fn from_str_in(s: &str, alloc: A) -> Result<Self> {
        let mut builder = Self::new_in(s.len(), alloc)?;
        builder.push_str(s)?;
        Ok(builder)
    }

    /// Length in bytes, excluding the terminator.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes that fit without growing, excluding the terminator.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.capacity().saturating_sub(1)
    }

    pub fn allocator(&self) -> &A {
        self.storage.allocator()
    }

    /// Shortens the visible contents to `len` bytes and rewrites the terminator.
    /// `len` must be below the storage length.
    fn terminate_at(&mut self, len: usize) {
        self.storage.as_mut_slice()[len] = 0;
        self.storage.truncate(len + 1);
    }

    /// Sets the visible capacity to exactly `capacity` bytes.
    ///
    /// If the contents are longer they are cut at `capacity`, backing off to
    /// the previous character boundary so the string stays valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` if the resize fails; the string is unchanged.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        let total = capacity
            .checked_add(1)
            .ok_or(Error::CapacityOverflow { count: capacity })?;
        let cut = (capacity < self.len()).then(|| {
            let s = self.as_str();
            (0..=capacity)
                .rev()
                .find(|&i| s.is_char_boundary(i))
                .unwrap_or(0)
        });
        self.storage.set_capacity(total)?;
        if let Some(cut) = cut {
            self.terminate_at(cut);
        }
        Ok(())
    }

    /// Makes room for at least `additional` more bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` if growth fails.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.storage.reserve(additional)
    }

    /// Empties the string, keeping its storage.
    pub fn clear(&mut self) {
        self.terminate_at(0);
    }

    /// Appends `s`.
    ///
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` if growth fails; the string is unchanged.
    pub fn push_str(&mut self, s: &str) -> Result<()> {
        self.storage.insert_slice(self.len(), s.as_bytes())
    }

    /// Appends the rendering of `args`.
    ///
    /// The output length is measured first, the storage grows once if
    /// needed, and then the text is rendered straight into place.
    ///
    /// # Errors
    ///
    /// - `Error::AllocationFailed` if growth fails
    /// - `Error::FormatFailed` if a `Display` impl fails, or renders a
    ///   different length the second time
    ///
    /// On error the string is unchanged.
    pub fn cat_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        let mut counter = CountingWriter(0);
        fmt::write(&mut counter, args).map_err(|_| Error::FormatFailed)?;
        let needed = counter.0;
        if needed == 0 {
            return Ok(());
        }

        let start = self.len();
        self.storage.insert_empty_run(start, needed)?;
        let mut writer = SliceWriter {
            buf: &mut self.storage.as_mut_slice()[start..start + needed],
            pos: 0,
        };
        let rendered = fmt::write(&mut writer, args);
        if rendered.is_err() || writer.pos != needed {
            tracing::debug!(needed, written = writer.pos, "render pass disagreed with dry run");
            self.storage.remove_range(start, needed)?;
            return Err(Error::FormatFailed);
        }
        Ok(())
    }

    /// Appends a value using its [`Cat`] rendering.
    ///
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` if growth fails.
    pub fn cat<T: Cat>(&mut self, value: T) -> Result<()> {
        value.append_to(self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: every mutation writes whole UTF-8 sequences or cuts at a
        // character boundary, so the visible bytes are always valid UTF-8
        unsafe { core::str::from_utf8_unchecked(self.as_bytes()) }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        let slice = self.storage.as_slice();
        debug_assert_eq!(slice.last(), Some(&0), "terminator missing");
        &slice[..slice.len() - 1]
    }

    /// Contents including the trailing NUL.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.storage.as_slice()
    }

    /// Contents as a C string. Stops at the first NUL, which is the
    /// terminator unless a `'\0'` was appended.
    #[must_use]
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(self.storage.as_slice()).unwrap_or_default()
    }

    /// Strips leading and trailing C whitespace (space, `\t`, `\n`, `\v`,
    /// `\f`, `\r`) and moves what is left to the front.
    pub fn trim(&mut self) {
        let bytes = self.as_bytes();
        let Some(start) = bytes.iter().position(|&b| !is_c_space(b)) else {
            self.clear();
            return;
        };
        let end = bytes
            .iter()
            .rposition(|&b| !is_c_space(b))
            .map_or(start, |i| i + 1);
        let kept = end - start;
        if start > 0 {
            self.storage.as_mut_slice().copy_within(start..end, 0);
        }
        self.terminate_at(kept);
    }

    /// Copies up to `len` bytes starting at `start` into a new string that
    /// uses a clone of this string's allocator. `len` is clamped to the bytes
    /// available.
    ///
    /// # Errors
    ///
    /// - `Error::IndexOutOfBounds` if `start >= self.len()`
    /// - `Error::InvalidArgument` if `len == 0`
    /// - `Error::NotCharBoundary` if either end splits a UTF-8 sequence
    /// - `Error::AllocationFailed` if the new string cannot be allocated
    pub fn substring(&self, start: usize, len: usize) -> Result<StringBuilder<A>>
    where
        A: Clone,
    {
        let length = self.len();
        if start >= length {
            return Err(Error::IndexOutOfBounds {
                index: start,
                length,
            });
        }
        if len == 0 {
            return Err(Error::InvalidArgument {
                parameter: "len",
                value: 0,
            });
        }
        let end = start + len.min(length - start);
        let s = self.as_str();
        for index in [start, end] {
            if !s.is_char_boundary(index) {
                return Err(Error::NotCharBoundary { index });
            }
        }
        StringBuilder::from_str_in(&s[start..end], self.allocator().clone())
    }

    /// Byte offset of the first occurrence of `needle`.
    ///
    /// An empty string or an empty needle finds nothing.
    #[must_use]
    pub fn find(&self, needle: &str) -> Option<usize> {
        if self.is_empty() || needle.is_empty() {
            return None;
        }
        self.as_str().find(needle)
    }
}

fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

struct CountingWriter(usize);

impl fmt::Write for CountingWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos + s.len();
        let dest = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dest.copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

/// Appends `format_args!` output to a [`StringBuilder`].
///
/// ```
/// # use allocvec::{cat, StringBuilder};
/// let mut s = StringBuilder::new(16).unwrap();
/// cat!(s, "{}-{:03}", "id", 7).unwrap();
/// assert_eq!(s, "id-007");
/// ```
#[macro_export]
macro_rules! cat {
    ($builder:expr, $($arg:tt)*) => {
        $builder.cat_fmt(::core::format_args!($($arg)*))
    };
}

/// Values that know how to append themselves to a [`StringBuilder`].
///
/// Integers render in decimal, floats with six decimals (`3.14` becomes
/// `"3.140000"`), and `bool` as `true`/`false`.
pub trait Cat {
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` if the builder cannot grow.
    fn append_to<A: Allocator>(&self, builder: &mut StringBuilder<A>) -> Result<()>;
}

impl<T: Cat + ?Sized> Cat for &T {
    fn append_to<A: Allocator>(&self, builder: &mut StringBuilder<A>) -> Result<()> {
        (**self).append_to(builder)
    }
}

impl Cat for str {
    fn append_to<A: Allocator>(&self, builder: &mut StringBuilder<A>) -> Result<()> {
        builder.push_str(self)
    }
}

impl Cat for String {
    fn append_to<A: Allocator>(&self, builder: &mut StringBuilder<A>) -> Result<()> {
        builder.push_str(self)
    }
}

impl Cat for char {
    fn append_to<A: Allocator>(&self, builder: &mut StringBuilder<A>) -> Result<()> {
        builder.push_str(self.encode_utf8(&mut [0; 4]))
    }
}

impl Cat for bool {
    fn append_to<A: Allocator>(&self, builder: &mut StringBuilder<A>) -> Result<()> {
        builder.push_str(if *self { "true" } else { "false" })
    }
}

macro_rules! cat_display {
    ($($t:ty),*) => {
        $(
            impl Cat for $t {
                fn append_to<A: Allocator>(&self, builder: &mut StringBuilder<A>) -> Result<()> {
                    builder.cat_fmt(format_args!("{}", self))
                }
            }
        )*
    };
}

cat_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! cat_float {
    ($($t:ty),*) => {
        $(
            impl Cat for $t {
                fn append_to<A: Allocator>(&self, builder: &mut StringBuilder<A>) -> Result<()> {
                    builder.cat_fmt(format_args!("{:.6}", self))
                }
            }
        )*
    };
}

cat_float!(f32, f64);

impl<A: Allocator> fmt::Write for StringBuilder<A> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s).map_err(|_| fmt::Error)
    }
}

impl FromStr for StringBuilder<DefaultAllocator> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_in(s, DefaultAllocator)
    }
}

impl<A: Allocator> fmt::Display for StringBuilder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<A: Allocator> fmt::Debug for StringBuilder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<A: Allocator> PartialEq<str> for StringBuilder<A> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<A: Allocator> PartialEq<&str> for StringBuilder<A> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
