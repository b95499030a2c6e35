//! Capacity tunables shared by every container.

use crate::error::{Error, Result};

/// Capacity used by constructors that do not take one explicitly.
pub const DEFAULT_INITIAL_CAPACITY: usize = 8;

/// Extra empty slots added on top of doubling whenever an array grows.
pub const GROWTH_RESERVE: usize = 4;

/// The growth rule applied by every operation that needs more room.
///
/// `new_capacity = max(current * 2 + reserve, required)`. Growth only ever
/// happens when `required > current`; callers never shrink through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Slots added after doubling.
    pub reserve: usize,
}

impl GrowthPolicy {
    /// The policy used by all containers in this crate.
    pub const STANDARD: GrowthPolicy = GrowthPolicy {
        reserve: GROWTH_RESERVE,
    };

    /// Computes the capacity to grow to so that at least `required` slots exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::CapacityOverflow` if the result does not fit in `usize`.
    pub fn next_capacity(&self, current: usize, required: usize) -> Result<usize> {
        let doubled = current
            .checked_mul(2)
            .and_then(|c| c.checked_add(self.reserve))
            .ok_or(Error::CapacityOverflow { count: current })?;
        Ok(doubled.max(required))
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Shorthand for `GrowthPolicy::STANDARD.next_capacity`.
///
/// # Errors
///
/// Returns `Error::CapacityOverflow` if the result does not fit in `usize`.
pub fn grown_capacity(current: usize, required: usize) -> Result<usize> {
    GrowthPolicy::STANDARD.next_capacity(current, required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubles_plus_reserve() {
        assert_eq!(grown_capacity(0, 1).unwrap(), 4);
        assert_eq!(grown_capacity(1, 2).unwrap(), 6);
        assert_eq!(grown_capacity(8, 9).unwrap(), 20);
    }

    #[test]
    fn test_large_requirement_wins() {
        assert_eq!(grown_capacity(2, 100).unwrap(), 100);
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(matches!(
            grown_capacity(usize::MAX / 2 + 1, usize::MAX),
            Err(Error::CapacityOverflow { .. })
        ));
    }

    #[test]
    fn test_default_is_standard() {
        assert_eq!(GrowthPolicy::default(), GrowthPolicy::STANDARD);
        assert_eq!(GrowthPolicy::default().reserve, GROWTH_RESERVE);
    }
}
