//! Overlap between the reference points of two datasets.
//!
//! For every read in dataset 1, the computation checks whether any read in dataset 2 on the same reference in the same orientation has the same reference point.
//! The partitions are the references of dataset 1 in both orientations, and they are processed with the same worker pool as relative positions.

use crate::{Error, IntervalReader, Partition, PartitionTask, PositionEnd, RecordSource};
use crate::{partition, scheduler};

use std::collections::HashSet;
use std::fmt::Display;

//-----------------------------------------------------------------------------

/// Parameters for the position overlap computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlapParams {
    /// Reference point for the reads in both datasets.
    pub reference_point: PositionEnd,
    /// Number of worker threads.
    pub concurrency: usize,
}

impl OverlapParams {
    /// Default for `concurrency`.
    pub const DEFAULT_CONCURRENCY: usize = 12;

    /// Checks that the parameters are valid.
    pub fn validate(&self) -> Result<(), Error> {
        if self.concurrency == 0 {
            return Err(Error::Configuration(String::from("Concurrency must be at least 1")));
        }
        Ok(())
    }
}

impl Default for OverlapParams {
    fn default() -> Self {
        Self {
            reference_point: PositionEnd::Head,
            concurrency: Self::DEFAULT_CONCURRENCY,
        }
    }
}

//-----------------------------------------------------------------------------

/// Number of dataset 1 reads whose reference point is occupied by dataset 2.
///
/// `positions` counts records and `reads` counts copy numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlapCount {
    /// Number of dataset 1 records.
    pub positions: usize,
    /// Number of dataset 1 records with an occupied reference point.
    pub occupied_positions: usize,
    /// Total copy number of dataset 1 records.
    pub reads: u64,
    /// Total copy number of dataset 1 records with an occupied reference point.
    pub occupied_reads: u64,
}

impl OverlapCount {
    /// Adds the counts from another partition.
    pub fn add(&mut self, other: &OverlapCount) {
        self.positions += other.positions;
        self.occupied_positions += other.occupied_positions;
        self.reads += other.reads;
        self.occupied_reads += other.occupied_reads;
    }

    /// Returns the percentage of occupied positions, or `0.0` if there are no positions.
    pub fn percent_positions(&self) -> f64 {
        percent(self.occupied_positions as f64, self.positions as f64)
    }

    /// Returns the percentage of occupied reads, or `0.0` if there are no reads.
    pub fn percent_reads(&self) -> f64 {
        percent(self.occupied_reads as f64, self.reads as f64)
    }
}

fn percent(part: f64, total: f64) -> f64 {
    if total > 0.0 { 100.0 * part / total } else { 0.0 }
}

impl Display for OverlapCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "total_pos:{}", self.positions)?;
        writeln!(f, "occupied_pos:{}", self.occupied_positions)?;
        writeln!(f, "percent_pos:{:.2}", self.percent_positions())?;
        writeln!(f, "total_reads:{}", self.reads)?;
        writeln!(f, "occupied_reads:{}", self.occupied_reads)?;
        writeln!(f, "percent_reads:{:.2}", self.percent_reads())
    }
}

//-----------------------------------------------------------------------------

impl PartitionTask for OverlapParams {
    type Output = OverlapCount;

    // Collects the dataset 2 positions first and then streams dataset 1 against them.
    fn process<R1: IntervalReader, R2: IntervalReader>(
        &self, reader1: &mut R1, reader2: &mut R2, partition: &Partition
    ) -> Result<Self::Output, Error> {
        let name = &partition.reference.name;
        let orientation = partition.orientation;
        let end = self.reference_point;

        let mut occupied = HashSet::new();
        reader2.for_each_interval(name, orientation, |interval| {
            occupied.insert(interval.position(orientation, end));
        })?;

        let mut result = OverlapCount::default();
        reader1.for_each_interval(name, orientation, |interval| {
            result.positions += 1;
            result.reads += interval.weight;
            if occupied.contains(&interval.position(orientation, end)) {
                result.occupied_positions += 1;
                result.occupied_reads += interval.weight;
            }
        })?;

        Ok(result)
    }
}

/// Counts the reads in dataset 1 that share their reference point with a read in dataset 2.
///
/// Only the references of dataset 1 are considered.
///
/// # Errors
///
/// Returns an error if the parameters are invalid.
/// Passes through the first error from the record sources.
///
/// # Examples
///
/// ```
/// use htsdb::{position_overlap, Interval, MemoryDataset, Orientation, OverlapParams};
///
/// let mut dataset1 = MemoryDataset::new();
/// dataset1.insert("chr1", Interval::new(10, 20, Orientation::Forward, 3).unwrap());
/// dataset1.insert("chr1", Interval::new(15, 20, Orientation::Forward, 1).unwrap());
/// let mut dataset2 = MemoryDataset::new();
/// dataset2.insert("chr1", Interval::new(10, 12, Orientation::Forward, 1).unwrap());
///
/// let count = position_overlap(&dataset1, &dataset2, &OverlapParams::default()).unwrap();
/// assert_eq!((count.positions, count.occupied_positions), (2, 1));
/// assert_eq!((count.reads, count.occupied_reads), (4, 3));
/// ```
pub fn position_overlap<S1: RecordSource, S2: RecordSource>(
    dataset1: &S1, dataset2: &S2, params: &OverlapParams
) -> Result<OverlapCount, Error> {
    params.validate()?;
    let references = dataset1.references()?;
    log::info!("Found {} references in dataset 1", references.len());
    let partitions = partition::partitions(&references);

    let mut result = OverlapCount::default();
    scheduler::run_partitions(dataset1, dataset2, partitions, params.concurrency, params, |count| result.add(&count))?;
    Ok(result)
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
