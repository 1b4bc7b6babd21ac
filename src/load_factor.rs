use crate::error::Error;
use crate::error::Result;

/// Smallest number of slots a non-empty table allocates.
pub(crate) const MIN_CAPACITY: usize = 4;

cfg_if::cfg_if! {
    if #[cfg(feature = "density-ninety")] {
        const DEFAULT_PERCENT: u8 = 90;
    } else if #[cfg(feature = "density-fifty")] {
        const DEFAULT_PERCENT: u8 = 50;
    } else {
        const DEFAULT_PERCENT: u8 = 75;
    }
}

/// Growth policy of a table, expressed as a whole percentage of its slots.
///
/// A table with `capacity` slots holds `n` entries only while
/// `n < capacity * percent / 100`. Inserting the entry that would reach the
/// threshold first doubles the capacity, so at least one slot is always empty
/// and every probe sequence terminates.
///
/// The default is chosen at compile time by the `density-*` features and is
/// 75% unless overridden.
///
/// # Examples
///
/// ```rust
/// use shift_hash::LoadFactor;
///
/// let lf = LoadFactor::from_percent(75).unwrap();
/// // A four slot table grows on its third insertion.
/// assert_eq!(lf.max_len(4), 2);
/// assert_eq!(lf.max_len(8), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadFactor {
    percent: u8,
}

impl LoadFactor {
    /// Lowest accepted percentage.
    pub const MIN_PERCENT: u8 = 10;
    /// Highest accepted percentage.
    pub const MAX_PERCENT: u8 = 95;
    /// The compile-time default load factor.
    pub const DEFAULT: LoadFactor = LoadFactor {
        percent: DEFAULT_PERCENT,
    };

    /// Creates a load factor of `percent`%.
    ///
    /// Fails with [`Error::InvalidLoadFactor`] unless `percent` lies within
    /// [`MIN_PERCENT`](Self::MIN_PERCENT)..=[`MAX_PERCENT`](Self::MAX_PERCENT).
    pub fn from_percent(percent: u8) -> Result<Self> {
        if (Self::MIN_PERCENT..=Self::MAX_PERCENT).contains(&percent) {
            Ok(Self { percent })
        } else {
            log::debug!("rejecting load factor of {percent}%");
            Err(Error::InvalidLoadFactor(percent))
        }
    }

    /// The configured percentage.
    pub fn percent(self) -> u8 {
        self.percent
    }

    #[inline(always)]
    fn threshold(self, capacity: usize) -> usize {
        ((capacity as u128 * self.percent as u128) / 100) as usize
    }

    /// Maximum number of entries a table of `capacity` slots holds before the
    /// next insertion grows it.
    pub fn max_len(self, capacity: usize) -> usize {
        self.threshold(capacity).saturating_sub(1)
    }

    /// Returns `true` if `len` entries fit in `capacity` slots.
    #[inline(always)]
    pub(crate) fn fits(self, capacity: usize, len: usize) -> bool {
        len < self.threshold(capacity)
    }

    /// Smallest power-of-two capacity that holds `len` entries.
    ///
    /// Zero entries need zero slots; anything else needs at least
    /// [`MIN_CAPACITY`].
    pub(crate) fn slots_for(self, len: usize) -> Result<usize> {
        if len == 0 {
            return Ok(0);
        }

        let mut capacity = MIN_CAPACITY;
        while !self.fits(capacity, len) {
            capacity = capacity.checked_mul(2).ok_or(Error::CapacityOverflow)?;
        }
        Ok(capacity)
    }
}

impl Default for LoadFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}
