//! Typed view of a sanitizer-coverage 8-bit counter table.
//!
//! The instrumentation hands out a table as a `[start, stop)` pair of raw pointers. A
//! [`CounterRegion`] keeps exactly that pair and reads the counters with volatile loads, since
//! instrumented code bumps them behind the compiler's back.

use std::{fmt, iter::FusedIterator, marker::PhantomData, ptr};

use crate::error::Error;

/// A contiguous span of byte-sized hit counters, `start` inclusive and `stop` exclusive.
///
/// Invariant: `start <= stop`, and both bounds are either null or non-null. The empty region has
/// two null bounds.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CounterRegion<'a> {
    start: *const u8,
    stop: *const u8,
    counters: PhantomData<&'a [u8]>,
}

// The region only reads through its pointers.
unsafe impl Send for CounterRegion<'_> {}
unsafe impl Sync for CounterRegion<'_> {}

impl<'a> CounterRegion<'a> {
    pub const fn empty() -> Self {
        Self {
            start: ptr::null(),
            stop: ptr::null(),
            counters: PhantomData,
        }
    }

    /// Builds a region from the bounds passed by the coverage runtime.
    ///
    /// # Safety
    ///
    /// Every byte in `[start, stop)` must stay readable for `'a`.
    pub unsafe fn from_raw(start: *const u8, stop: *const u8) -> Result<Self, Error> {
        if start.is_null() != stop.is_null() {
            return Err(Error::PartialRegion {
                start: start as usize,
                stop: stop as usize,
            });
        }

        if start > stop {
            return Err(Error::InvertedRegion {
                start: start as usize,
                stop: stop as usize,
            });
        }

        Ok(Self {
            start,
            stop,
            counters: PhantomData,
        })
    }

    /// # Safety
    ///
    /// `[start, start + len)` must be a single allocation which stays readable for `'a`.
    pub(crate) unsafe fn from_raw_parts(start: *const u8, len: usize) -> Self {
        Self {
            start,
            stop: start.add(len),
            counters: PhantomData,
        }
    }

    pub fn from_slice(counters: &'a [u8]) -> Self {
        let range = counters.as_ptr_range();
        Self {
            start: range.start,
            stop: range.end,
            counters: PhantomData,
        }
    }

    pub fn start(&self) -> *const u8 {
        self.start
    }

    pub fn stop(&self) -> *const u8 {
        self.stop
    }

    pub fn len(&self) -> usize {
        self.stop as usize - self.start as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// Iterates the counters from `start` to `stop`.
    pub fn iter(&self) -> Counters<'a> {
        Counters {
            cursor: self.start,
            stop: self.stop,
            counters: PhantomData,
        }
    }

    /// Copies the current counter values.
    pub fn snapshot(&self) -> Vec<u8> {
        self.iter().collect()
    }

    /// Number of counters which were hit at least once.
    pub fn hit_count(&self) -> usize {
        self.iter().filter(|hits| *hits != 0).count()
    }
}

impl Default for CounterRegion<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for CounterRegion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterRegion")
            .field("start", &self.start)
            .field("stop", &self.stop)
            .field("len", &self.len())
            .finish()
    }
}

impl<'a> IntoIterator for &CounterRegion<'a> {
    type Item = u8;
    type IntoIter = Counters<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the counter values of a [`CounterRegion`].
#[derive(Debug, Clone)]
pub struct Counters<'a> {
    cursor: *const u8,
    stop: *const u8,
    counters: PhantomData<&'a [u8]>,
}

impl Iterator for Counters<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.cursor >= self.stop {
            return None;
        }

        // SAFETY: `cursor` lies in `[start, stop)` of a region whose bytes are readable.
        let hits = unsafe { ptr::read_volatile(self.cursor) };
        self.cursor = self.cursor.wrapping_add(1);
        Some(hits)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.stop as usize - self.cursor as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Counters<'_> {}

impl FusedIterator for Counters<'_> {}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::CounterRegion;
    use crate::error::Error;

    #[test_log::test]
    fn test_empty_region() {
        let region = CounterRegion::empty();
        assert!(region.is_empty());
        assert_eq!(region.len(), 0);
        assert_eq!(region.iter().next(), None);
        assert_eq!(region, CounterRegion::default());
    }

    #[test_log::test]
    fn test_slice_region() {
        let counters = [0u8, 3, 0, 255, 1];
        let region = CounterRegion::from_slice(&counters);

        assert_eq!(region.len(), 5);
        assert_eq!(region.iter().len(), 5);
        assert_eq!(region.snapshot(), counters.to_vec());
        assert_eq!(region.hit_count(), 3);
    }

    #[test_log::test]
    fn test_from_raw_accepts_bounds() {
        let counters = [7u8; 16];
        let range = counters.as_ptr_range();
        let region = unsafe { CounterRegion::from_raw(range.start, range.end) }.unwrap();

        assert_eq!(region.len(), 16);
        assert!(region.iter().all(|hits| hits == 7));
    }

    #[test_log::test]
    fn test_from_raw_accepts_null_pair() {
        let region = unsafe { CounterRegion::from_raw(ptr::null(), ptr::null()) }.unwrap();
        assert!(region.is_empty());
    }

    #[test_log::test]
    fn test_from_raw_rejects_inverted() {
        let counters = [0u8; 4];
        let range = counters.as_ptr_range();
        let result = unsafe { CounterRegion::from_raw(range.end, range.start) };

        assert!(matches!(result, Err(Error::InvertedRegion { .. })));
    }

    #[test_log::test]
    fn test_from_raw_rejects_half_null() {
        let counters = [0u8; 4];
        let result = unsafe { CounterRegion::from_raw(ptr::null(), counters.as_ptr()) };

        assert!(matches!(result, Err(Error::PartialRegion { .. })));
    }

    #[test_log::test]
    fn test_partially_consumed_iterator() {
        let counters = [1u8, 2, 3];
        let region = CounterRegion::from_slice(&counters);
        let mut iter = region.iter();

        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.collect::<Vec<_>>(), vec![2, 3]);
    }
}
