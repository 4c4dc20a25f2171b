//! Abstract record sources for aligned reads.
//!
//! A record source is a dataset of aligned reads partitioned by reference sequence and orientation.
//! The computation only needs two things from it: the catalog of reference sequences and a way to stream the intervals in one partition.
//! Each worker thread creates its own [`IntervalReader`] with [`RecordSource::reader`], so readers never cross thread boundaries.
//!
//! [`crate::Dataset`] implements the interface for a table in a SQLite database and [`MemoryDataset`] for records stored in memory.

use crate::{Error, Interval, Orientation, Reference};

use std::collections::BTreeMap;

//-----------------------------------------------------------------------------

/// A dataset of aligned reads that can be shared between worker threads.
pub trait RecordSource: Sync {
    /// Per-thread reader for the intervals.
    type Reader<'a>: IntervalReader where Self: 'a;

    /// Returns a new reader for the intervals.
    ///
    /// Passes through any storage errors.
    fn reader(&self) -> Result<Self::Reader<'_>, Error>;

    /// Returns the reference sequences present in the dataset, sorted by name.
    ///
    /// The length of a reference is the maximal end coordinate over the intervals aligned to it.
    fn references(&self) -> Result<Vec<Reference>, Error>;
}

/// Streams the intervals in one partition of a dataset.
pub trait IntervalReader {
    /// Calls `f` for every interval aligned to the given reference in the given orientation.
    ///
    /// The intervals are streamed lazily in storage order.
    /// Returns an error if the storage fails at any point or if a record is invalid.
    fn for_each_interval<F: FnMut(Interval)>(&mut self, reference: &str, orientation: Orientation, f: F) -> Result<(), Error>;
}

impl<R: IntervalReader + ?Sized> IntervalReader for &mut R {
    fn for_each_interval<F: FnMut(Interval)>(&mut self, reference: &str, orientation: Orientation, f: F) -> Result<(), Error> {
        (**self).for_each_interval(reference, orientation, f)
    }
}

//-----------------------------------------------------------------------------

/// A dataset stored in memory.
///
/// This is mostly useful for testing and for small datasets produced by other tools.
///
/// # Examples
///
/// ```
/// use htsdb::{Interval, IntervalReader, MemoryDataset, Orientation, RecordSource, Reference};
///
/// let mut dataset = MemoryDataset::new();
/// dataset.insert("chr1", Interval::new(10, 20, Orientation::Forward, 2).unwrap());
/// dataset.insert("chr1", Interval::new(30, 35, Orientation::Reverse, 1).unwrap());
/// dataset.insert("chr2", Interval::new(0, 5, Orientation::Forward, 1).unwrap());
///
/// let references = dataset.references().unwrap();
/// assert_eq!(references, vec![Reference::new("chr1", 35), Reference::new("chr2", 5)]);
///
/// let mut reader = dataset.reader().unwrap();
/// let mut starts = Vec::new();
/// reader.for_each_interval("chr1", Orientation::Reverse, |interval| starts.push(interval.start)).unwrap();
/// assert_eq!(starts, vec![30]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryDataset {
    records: Vec<(String, Interval)>,
}

impl MemoryDataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an interval aligned to the given reference.
    pub fn insert(&mut self, reference: &str, interval: Interval) {
        self.records.push((reference.to_string(), interval));
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Interval)> {
        self.records.iter().map(|(name, interval)| (name.as_str(), interval))
    }
}

impl FromIterator<(String, Interval)> for MemoryDataset {
    fn from_iter<T: IntoIterator<Item = (String, Interval)>>(iter: T) -> Self {
        MemoryDataset { records: iter.into_iter().collect() }
    }
}

impl RecordSource for MemoryDataset {
    type Reader<'a> = MemoryReader<'a>;

    fn reader(&self) -> Result<Self::Reader<'_>, Error> {
        Ok(MemoryReader { dataset: self })
    }

    fn references(&self) -> Result<Vec<Reference>, Error> {
        let mut lengths: BTreeMap<&str, usize> = BTreeMap::new();
        for (name, interval) in self.records.iter() {
            let length = lengths.entry(name).or_insert(0);
            *length = (*length).max(interval.end);
        }
        Ok(lengths.into_iter().map(|(name, length)| Reference::new(name, length)).collect())
    }
}

/// A reader for [`MemoryDataset`].
#[derive(Clone, Copy, Debug)]
pub struct MemoryReader<'a> {
    dataset: &'a MemoryDataset,
}

impl<'a> IntervalReader for MemoryReader<'a> {
    fn for_each_interval<F: FnMut(Interval)>(&mut self, reference: &str, orientation: Orientation, mut f: F) -> Result<(), Error> {
        let matching = self.dataset.records.iter().filter(|(name, interval)| {
            name == reference && interval.orientation == orientation
        });
        for (_, interval) in matching {
            f(*interval);
        }
        Ok(())
    }
}

//-----------------------------------------------------------------------------
