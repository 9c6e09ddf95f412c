//! Length limits for variable-size codecs.
//!
//! Byte strings, strings, vectors and sets read a varuint length prefix from the buffer. A
//! [RangeCfg] attached to the codec at construction bounds that length, which keeps a decoder from
//! trusting an attacker-controlled count.

use crate::Error;
use core::ops::{Bound, RangeBounds};
use tracing::debug;

/// Configuration for limiting the range of a value.
///
/// # Examples
///
/// ```
/// use wirecodec::RangeCfg;
///
/// // Limit lengths to 0..=1024
/// let cfg = RangeCfg::new(0..=1024);
/// assert!(cfg.contains(&500));
/// assert!(!cfg.contains(&2000));
///
/// // Allow any length >= 1
/// let cfg_min = RangeCfg::from(1..);
/// assert!(cfg_min.contains(&1));
/// assert!(!cfg_min.contains(&0));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RangeCfg<T: Copy + PartialOrd = usize> {
    start: Bound<T>,
    end: Bound<T>,
}

macro_rules! impl_from_range {
    ($($range:ty),+) => {
        $(
            impl<T: Copy + PartialOrd> From<$range> for RangeCfg<T> {
                fn from(r: $range) -> Self {
                    Self::new(r)
                }
            }
        )+
    };
}
impl_from_range!(
    core::ops::Range<T>,
    core::ops::RangeInclusive<T>,
    core::ops::RangeFrom<T>,
    core::ops::RangeTo<T>,
    core::ops::RangeToInclusive<T>
);

impl<T: Copy + PartialOrd> From<core::ops::RangeFull> for RangeCfg<T> {
    fn from(_: core::ops::RangeFull) -> Self {
        Self::new(..)
    }
}

impl<T: Copy + PartialOrd> Default for RangeCfg<T> {
    fn default() -> Self {
        Self::new(..)
    }
}

impl<T: Copy + PartialOrd> RangeCfg<T> {
    /// Creates a new `RangeCfg` from any type implementing `RangeBounds<T>`.
    pub fn new(r: impl RangeBounds<T>) -> Self {
        RangeCfg {
            start: r.start_bound().cloned(),
            end: r.end_bound().cloned(),
        }
    }

    /// Creates a `RangeCfg` that only accepts exactly `value`.
    pub fn exact(value: T) -> Self {
        Self {
            start: Bound::Included(value),
            end: Bound::Included(value),
        }
    }

    /// Returns true if the value is within this range.
    pub fn contains(&self, value: &T) -> bool {
        match &self.start {
            Bound::Included(s) if value < s => return false,
            Bound::Excluded(s) if value <= s => return false,
            _ => {}
        }
        match &self.end {
            Bound::Included(e) if value > e => return false,
            Bound::Excluded(e) if value >= e => return false,
            _ => {}
        }
        true
    }
}

impl RangeCfg<usize> {
    /// Fails with [Error::InvalidLength] if `len` is outside this range.
    pub fn check(&self, len: usize) -> Result<(), Error> {
        if !self.contains(&len) {
            debug!(len, range = ?self, "length out of range");
            return Err(Error::InvalidLength(len));
        }
        Ok(())
    }
}

impl<T: Copy + PartialOrd> RangeBounds<T> for RangeCfg<T> {
    fn start_bound(&self) -> Bound<&T> {
        self.start.as_ref()
    }

    fn end_bound(&self) -> Bound<&T> {
        self.end.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ops::Bound::{Excluded, Included, Unbounded};
    use test_case::test_case;

    #[test]
    fn test_range_cfg_from() {
        let cfg: RangeCfg = (..).into();
        assert_eq!((cfg.start, cfg.end), (Unbounded, Unbounded));

        let cfg: RangeCfg = (5..).into();
        assert_eq!((cfg.start, cfg.end), (Included(5), Unbounded));

        let cfg: RangeCfg = (..10).into();
        assert_eq!((cfg.start, cfg.end), (Unbounded, Excluded(10)));

        let cfg: RangeCfg = (5..=10).into();
        assert_eq!((cfg.start, cfg.end), (Included(5), Included(10)));

        assert_eq!(RangeCfg::exact(3usize), RangeCfg::from(3..=3));
        assert_eq!(RangeCfg::<usize>::default(), RangeCfg::from(..));
    }

    #[test_case(RangeCfg::from(..), 0, true; "unbounded zero")]
    #[test_case(RangeCfg::from(..), usize::MAX, true; "unbounded max")]
    #[test_case(RangeCfg::from(5..), 4, false; "below inclusive start")]
    #[test_case(RangeCfg::from(5..), 5, true; "at inclusive start")]
    #[test_case(RangeCfg::from(..10), 10, false; "at exclusive end")]
    #[test_case(RangeCfg::from(..=10), 10, true; "at inclusive end")]
    #[test_case(RangeCfg::from(5..5), 5, false; "empty range")]
    fn test_range_cfg_contains(cfg: RangeCfg, value: usize, expected: bool) {
        assert_eq!(cfg.contains(&value), expected);
    }

    #[test]
    fn test_exclusive_start() {
        let cfg = RangeCfg {
            start: Excluded(5usize),
            end: Included(10),
        };
        assert!(!cfg.contains(&5));
        assert!(cfg.contains(&6));
        assert!(cfg.contains(&10));
        assert!(!cfg.contains(&11));
    }

    #[test]
    fn test_check() {
        let cfg = RangeCfg::new(1usize..=4);
        assert!(cfg.check(1).is_ok());
        assert!(cfg.check(4).is_ok());
        assert!(matches!(cfg.check(0), Err(Error::InvalidLength(0))));
        assert!(matches!(cfg.check(5), Err(Error::InvalidLength(5))));
    }
}
