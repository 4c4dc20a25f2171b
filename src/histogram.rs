//! Dense histograms of signed relative offsets.

use std::ops::RangeInclusive;

//-----------------------------------------------------------------------------

/// Pair counts for every relative offset in `[-span, span]`.
///
/// The counts are stored in a dense array indexed by `offset + span`, so every offset in the range has a count, even if it is zero.
/// Histograms with the same span can be merged by summing the counts pointwise.
///
/// # Examples
///
/// ```
/// use htsdb::Histogram;
///
/// let mut histogram = Histogram::new(2);
/// histogram.add(-2, 3);
/// histogram.add(1, 1);
/// assert_eq!(histogram.get(-2), 3);
/// assert_eq!(histogram.get(0), 0);
/// assert_eq!(histogram.total(), 4);
///
/// let mut other = Histogram::new(2);
/// other.add(1, 5);
/// histogram.merge(&other);
/// let counts: Vec<(isize, u64)> = histogram.iter().collect();
/// assert_eq!(counts, vec![(-2, 3), (-1, 0), (0, 0), (1, 6), (2, 0)]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    span: usize,
    counts: Vec<u64>,
}

impl Histogram {
    /// Creates an empty histogram for offsets in `[-span, span]`.
    pub fn new(span: usize) -> Self {
        Histogram {
            span,
            counts: vec![0; 2 * span + 1],
        }
    }

    /// Returns the span of the histogram.
    #[inline]
    pub fn span(&self) -> usize {
        self.span
    }

    /// Returns the range of offsets covered by the histogram.
    #[inline]
    pub fn offsets(&self) -> RangeInclusive<isize> {
        -(self.span as isize)..=(self.span as isize)
    }

    // Returns the array index for the offset, or `None` if the offset is out of range.
    #[inline]
    fn index(&self, offset: isize) -> Option<usize> {
        let index = offset.checked_add(self.span as isize)?;
        if index < 0 || index as usize >= self.counts.len() {
            None
        } else {
            Some(index as usize)
        }
    }

    /// Returns the count for the offset, or `0` if the offset is out of range.
    #[inline]
    pub fn get(&self, offset: isize) -> u64 {
        self.index(offset).map_or(0, |index| self.counts[index])
    }

    /// Adds `count` to the given offset.
    ///
    /// # Panics
    ///
    /// Panics if the offset is outside `[-span, span]`.
    #[inline]
    pub fn add(&mut self, offset: isize, count: u64) {
        let index = self.index(offset).unwrap_or_else(|| {
            panic!("Offset {} is outside [-{}, {}]", offset, self.span, self.span)
        });
        self.counts[index] += count;
    }

    /// Adds the counts from the other histogram to this histogram.
    ///
    /// # Panics
    ///
    /// Panics if the spans are not equal.
    pub fn merge(&mut self, other: &Histogram) {
        assert_eq!(self.span, other.span, "Cannot merge histograms with different spans");
        for (count, other_count) in self.counts.iter_mut().zip(other.counts.iter()) {
            *count += *other_count;
        }
    }

    /// Returns the sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Returns `true` if all counts are zero.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }

    /// Returns an iterator over `(offset, count)` pairs in increasing order of offset.
    pub fn iter(&self) -> impl Iterator<Item = (isize, u64)> + '_ {
        self.offsets().zip(self.counts.iter().copied())
    }
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
