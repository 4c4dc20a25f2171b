//! # HTS-base: relative read positions over SQLite alignment databases.
//!
//! Aligned reads are stored in SQLite tables with one row per read.
//! Each row has columns `rname` (reference sequence name), `strand` (`1` or `-1`), `start` and `stop` (0-based inclusive coordinates), and `copy_number` (number of identical reads collapsed into the row).
//! A table can be restricted to a subset of the reads with an SQL filter expression.
//! See [`Dataset`] for the database interface.
//!
//! # Relative positions
//!
//! The main computation compares two datasets of aligned reads.
//! Each read is reduced to a single reference point: its 5' end (head) or its 3' end (tail) in the orientation of the read.
//! For every pair of reads from dataset 1 and dataset 2 on the same reference in the same orientation, with reference points at most `span` bases apart, the signed offset of the dataset 1 point from the dataset 2 point is counted in a histogram.
//! Positive offsets are downstream in the orientation of the reads.
//! Dataset 1 reads are weighted by their copy numbers.
//!
//! The work is split into partitions: one for each reference sequence in each orientation.
//! The partitions are processed in parallel, and the results are merged into a single histogram or into a histogram for each reference.
//! See [`relative_positions`] and [`RelPosParams`] for the computation and [`write_report`] for reporting the results.
//!
//! # Other statistics
//!
//! [`Dataset::count_reads`] and [`Dataset::size_distribution`] summarize a single table.
//! [`position_overlap`] counts the reads in dataset 1 that share their reference point with a read in dataset 2.
//!
//! Any data source can be used instead of a SQLite table by implementing [`RecordSource`].

pub mod db;
pub mod error;
pub mod histogram;
pub mod interval;
pub mod overlap;
pub mod partition;
pub mod report;
pub mod scheduler;
pub mod source;
pub mod utils;
pub mod worker;

pub use db::{Dataset, DatasetReader, ReadCount};
pub use error::Error;
pub use histogram::Histogram;
pub use interval::{Interval, Orientation, PositionEnd, Reference};
pub use overlap::{position_overlap, OverlapCount, OverlapParams};
pub use partition::Partition;
pub use report::{write_report, write_size_distribution, ReportSink, TableWriter};
pub use scheduler::{relative_positions, process_partitions, run_partitions, Aggregator, PartitionTask, RelPosParams, RelativePositions, Summary};
pub use source::{IntervalReader, MemoryDataset, RecordSource};
pub use worker::{PartitionResult, PartitionWorker, WeightedIndex};

#[cfg(test)]
mod internal;
