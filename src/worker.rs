//! Relative position histogram for a single partition.
//!
//! The worker indexes the reference points of dataset 1 in the partition and then streams the reference points of dataset 2 against the index.
//! For each dataset 2 point `p2` and each offset `delta` in `[-span, span]`, the weight of dataset 1 at `p2 + delta` is added to the histogram.
//! The offset is multiplied by the sign of the orientation, so that a positive offset always means that the dataset 1 point is downstream of the dataset 2 point.
//! Then histograms from forward and reverse partitions can be summed directly.

use crate::{Error, Histogram, IntervalReader, Orientation, Partition, RelPosParams};

use std::collections::{HashMap, HashSet};

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Accumulated weights of reference points in one partition of dataset 1.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeightedIndex {
    weights: HashMap<usize, u64>,
}

impl WeightedIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reference point with the given weight and returns `true` if the point was counted.
    ///
    /// If `collapse` is set, each distinct position is counted at most once with weight 1.
    /// Then a position that is already present is ignored.
    pub fn insert(&mut self, position: usize, weight: u64, collapse: bool) -> bool {
        if collapse {
            if self.weights.contains_key(&position) {
                return false;
            }
            self.weights.insert(position, 1);
        } else {
            *self.weights.entry(position).or_insert(0) += weight;
        }
        true
    }

    /// Returns the accumulated weight at the position.
    #[inline]
    pub fn get(&self, position: usize) -> u64 {
        self.weights.get(&position).copied().unwrap_or(0)
    }

    /// Returns the number of distinct positions.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns `true` if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Returns the maximum weight over all positions, or `0` if the index is empty.
    pub fn max_weight(&self) -> u64 {
        self.weights.values().copied().max().unwrap_or(0)
    }
}

//-----------------------------------------------------------------------------

/// Output of a worker for one partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionResult {
    /// The partition.
    pub partition: Partition,
    /// Pair counts by relative offset.
    pub histogram: Histogram,
    /// Number of counted reads in dataset 1.
    pub read_count1: usize,
    /// Number of counted reads in dataset 2.
    pub read_count2: usize,
}

//-----------------------------------------------------------------------------

/// Computes relative position histograms for partitions using a pair of readers.
///
/// A worker is owned by a single thread.
/// It can process any number of partitions, one at a time, and it keeps no state between them.
pub struct PartitionWorker<'a, R1: IntervalReader, R2: IntervalReader> {
    reader1: R1,
    reader2: R2,
    params: &'a RelPosParams,
}

impl<'a, R1: IntervalReader, R2: IntervalReader> PartitionWorker<'a, R1, R2> {
    /// Creates a new worker reading dataset 1 from `reader1` and dataset 2 from `reader2`.
    pub fn new(reader1: R1, reader2: R2, params: &'a RelPosParams) -> Self {
        PartitionWorker { reader1, reader2, params }
    }

    /// Returns the orientation of the dataset 1 reads compared to the dataset 2 reads in the given orientation.
    pub fn query_orientation(&self, orientation: Orientation) -> Orientation {
        if self.params.anti_sense {
            orientation.flip()
        } else {
            orientation
        }
    }

    /// Builds the weighted index for dataset 1 in the partition.
    ///
    /// Returns the index and the number of counted reads.
    /// Passes through any errors from the reader.
    pub fn index_dataset1(&mut self, partition: &Partition) -> Result<(WeightedIndex, usize), Error> {
        let orientation = self.query_orientation(partition.orientation);
        let end = self.params.reference_point1;
        let collapse = self.params.collapse1;

        let mut index = WeightedIndex::new();
        let mut read_count = 0;
        self.reader1.for_each_interval(&partition.reference.name, orientation, |interval| {
            let position = interval.position(orientation, end);
            if index.insert(position, interval.weight, collapse) {
                read_count += 1;
            }
        })?;

        Ok((index, read_count))
    }

    /// Streams dataset 2 in the partition against the index.
    ///
    /// Returns the histogram and the number of counted reads.
    /// Passes through any errors from the reader.
    pub fn scan_dataset2(&mut self, partition: &Partition, index: &WeightedIndex) -> Result<(Histogram, usize), Error> {
        let orientation = partition.orientation;
        let end = self.params.reference_point2;
        let collapse = self.params.collapse2;
        let span = self.params.span as isize;
        let sign = orientation.sign();

        let mut histogram = Histogram::new(self.params.span);
        let mut visited: HashSet<usize> = HashSet::new();
        let mut read_count = 0;
        self.reader2.for_each_interval(&partition.reference.name, orientation, |interval| {
            let position = interval.position(orientation, end);
            if collapse && !visited.insert(position) {
                return;
            }
            read_count += 1;
            if index.is_empty() {
                return;
            }
            for delta in -span..=span {
                // There are no negative coordinates.
                let Some(target) = position.checked_add_signed(delta) else {
                    continue;
                };
                let weight = index.get(target);
                if weight > 0 {
                    histogram.add(delta * sign, weight);
                }
            }
        })?;

        Ok((histogram, read_count))
    }

    /// Computes the histogram and read counts for the partition.
    ///
    /// Dataset 1 is indexed completely before dataset 2 is streamed.
    /// Passes through any errors from the readers.
    pub fn process(&mut self, partition: &Partition) -> Result<PartitionResult, Error> {
        let (index, read_count1) = self.index_dataset1(partition)?;
        let (histogram, read_count2) = self.scan_dataset2(partition, &index)?;
        Ok(PartitionResult {
            partition: partition.clone(),
            histogram,
            read_count1,
            read_count2,
        })
    }
}

//-----------------------------------------------------------------------------
