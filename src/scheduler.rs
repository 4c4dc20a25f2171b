//! Parallel computations over all partitions.
//!
//! The partitions are placed in a job queue that is filled once and then closed.
//! A fixed number of worker threads take partitions from the queue, process them with a [`PartitionTask`], and send the results to a bounded result channel.
//! The calling thread is the only consumer of the channel.
//! For relative positions, it merges the results into a [`RelativePositions`] structure.
//!
//! The first error stops the computation.
//! The workers stop taking new jobs, the error is returned, and no partial results are reported.

use crate::{Error, Histogram, IntervalReader, Partition, PartitionResult, PartitionWorker, PositionEnd, RecordSource, Reference};
use crate::partition;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;


//-----------------------------------------------------------------------------

/// Parameters for the relative position computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelPosParams {
    /// Maximum absolute relative offset.
    pub span: usize,
    /// Reference point for reads in dataset 1.
    pub reference_point1: PositionEnd,
    /// Reference point for reads in dataset 2.
    pub reference_point2: PositionEnd,
    /// Compare dataset 1 reads in the opposite orientation instead of the same orientation.
    pub anti_sense: bool,
    /// Count each distinct position in dataset 1 at most once.
    pub collapse1: bool,
    /// Count each distinct position in dataset 2 at most once.
    pub collapse2: bool,
    /// Report a separate histogram for each reference sequence.
    pub group_by_reference: bool,
    /// Number of worker threads.
    pub concurrency: usize,
}

impl RelPosParams {
    /// Default for `span`.
    pub const DEFAULT_SPAN: usize = 100;
    /// Default for `concurrency`.
    pub const DEFAULT_CONCURRENCY: usize = 12;
    /// Maximum value for `span`.
    ///
    /// Every partition allocates a histogram of `2 * span + 1` counters.
    pub const MAX_SPAN: usize = 1 << 24;

    /// Checks that the parameters are valid.
    pub fn validate(&self) -> Result<(), Error> {
        if self.concurrency == 0 {
            return Err(Error::Configuration(String::from("Concurrency must be at least 1")));
        }
        if self.span > Self::MAX_SPAN {
            return Err(Error::Configuration(format!("Span {} is larger than {}", self.span, Self::MAX_SPAN)));
        }
        Ok(())
    }
}

impl Default for RelPosParams {
    fn default() -> Self {
        Self {
            span: Self::DEFAULT_SPAN,
            reference_point1: PositionEnd::Head,
            reference_point2: PositionEnd::Head,
            anti_sense: false,
            collapse1: false,
            collapse2: false,
            group_by_reference: false,
            concurrency: Self::DEFAULT_CONCURRENCY,
        }
    }
}

//-----------------------------------------------------------------------------

/// A histogram with the read counts for the datasets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Pair counts by relative offset.
    pub histogram: Histogram,
    /// Number of counted reads in dataset 1.
    pub read_count1: usize,
    /// Number of counted reads in dataset 2.
    pub read_count2: usize,
}

impl Summary {
    /// Creates an empty summary for offsets in `[-span, span]`.
    pub fn new(span: usize) -> Self {
        Summary {
            histogram: Histogram::new(span),
            read_count1: 0,
            read_count2: 0,
        }
    }

    /// Adds the result of a partition to the summary.
    pub fn add(&mut self, result: &PartitionResult) {
        self.histogram.merge(&result.histogram);
        self.read_count1 += result.read_count1;
        self.read_count2 += result.read_count2;
    }
}

/// Merged results of a relative position computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelativePositions {
    /// A single summary over all reference sequences.
    Aggregate(Summary),
    /// A summary for each reference sequence, ordered by name.
    Grouped(BTreeMap<String, Summary>),
}

//-----------------------------------------------------------------------------

/// Merges partition results into either a single summary or a summary per reference.
///
/// Merging is a pointwise sum, so the order of the results does not matter.
#[derive(Clone, Debug)]
pub struct Aggregator {
    span: usize,
    result: RelativePositions,
    partitions: usize,
}

impl Aggregator {
    /// Creates a new aggregator.
    ///
    /// In grouped mode, every reference gets a summary even if no results are added for it.
    pub fn new(references: &[Reference], params: &RelPosParams) -> Self {
        let result = if params.group_by_reference {
            let summaries = references.iter().map(|reference| {
                (reference.name.clone(), Summary::new(params.span))
            }).collect();
            RelativePositions::Grouped(summaries)
        } else {
            RelativePositions::Aggregate(Summary::new(params.span))
        };
        Aggregator { span: params.span, result, partitions: 0 }
    }

    /// Adds the result of a partition.
    pub fn add(&mut self, result: &PartitionResult) {
        match &mut self.result {
            RelativePositions::Aggregate(summary) => summary.add(result),
            RelativePositions::Grouped(summaries) => {
                let span = self.span;
                summaries.entry(result.partition.reference.name.clone())
                    .or_insert_with(|| Summary::new(span))
                    .add(result);
            },
        }
        self.partitions += 1;
    }

    /// Returns the number of partition results added so far.
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Returns the merged results.
    pub fn finish(self) -> RelativePositions {
        self.result
    }
}

//-----------------------------------------------------------------------------

/// Computes relative positions of reads in dataset 1 against reads in dataset 2.
///
/// The partitions are every reference sequence present in either dataset in both orientations.
/// See [`RelPosParams`] for the parameters.
///
/// # Errors
///
/// Returns an error if the parameters are invalid.
/// Passes through the first error from the record sources.
///
/// # Examples
///
/// ```
/// use htsdb::{relative_positions, Interval, MemoryDataset, Orientation, RelativePositions, RelPosParams};
///
/// let mut dataset1 = MemoryDataset::new();
/// dataset1.insert("chr1", Interval::new(10, 11, Orientation::Forward, 1).unwrap());
/// let mut dataset2 = MemoryDataset::new();
/// dataset2.insert("chr1", Interval::new(12, 13, Orientation::Forward, 1).unwrap());
///
/// let params = RelPosParams { span: 5, ..RelPosParams::default() };
/// let result = relative_positions(&dataset1, &dataset2, &params).unwrap();
/// if let RelativePositions::Aggregate(summary) = result {
///     assert_eq!(summary.histogram.get(-2), 1);
///     assert_eq!(summary.histogram.total(), 1);
///     assert_eq!((summary.read_count1, summary.read_count2), (1, 1));
/// } else {
///     panic!("Expected an aggregate result");
/// }
/// ```
pub fn relative_positions<S1: RecordSource, S2: RecordSource>(
    dataset1: &S1, dataset2: &S2, params: &RelPosParams
) -> Result<RelativePositions, Error> {
    params.validate()?;
    let references = partition::reference_catalog(dataset1, dataset2)?;
    let partitions = partition::partitions(&references);
    process_partitions(dataset1, dataset2, &references, partitions, params)
}

/// Processes the given partitions in parallel and merges the results.
///
/// `references` determines the summaries reported in grouped mode.
/// Every partition is processed exactly once.
/// The function returns after all worker threads have finished.
///
/// # Errors
///
/// Returns an error if the parameters are invalid.
/// Passes through the first error from the record sources.
pub fn process_partitions<S1: RecordSource, S2: RecordSource>(
    dataset1: &S1, dataset2: &S2,
    references: &[Reference], partitions: Vec<Partition>,
    params: &RelPosParams
) -> Result<RelativePositions, Error> {
    params.validate()?;
    let mut aggregator = Aggregator::new(references, params);
    run_partitions(dataset1, dataset2, partitions, params.concurrency, params, |result| aggregator.add(&result))?;
    Ok(aggregator.finish())
}

//-----------------------------------------------------------------------------

/// A computation that processes each partition independently.
///
/// The task is shared between the worker threads.
/// Each worker thread calls [`PartitionTask::process`] with its own readers.
pub trait PartitionTask: Sync {
    /// Result for a single partition.
    type Output: Send;

    /// Processes the partition using readers for dataset 1 and dataset 2.
    fn process<R1: IntervalReader, R2: IntervalReader>(
        &self, reader1: &mut R1, reader2: &mut R2, partition: &Partition
    ) -> Result<Self::Output, Error>;
}

impl PartitionTask for RelPosParams {
    type Output = PartitionResult;

    fn process<R1: IntervalReader, R2: IntervalReader>(
        &self, reader1: &mut R1, reader2: &mut R2, partition: &Partition
    ) -> Result<Self::Output, Error> {
        let mut worker = PartitionWorker::new(reader1, reader2, self);
        worker.process(partition)
    }
}

/// Runs the task on every partition with a pool of `concurrency` worker threads.
///
/// The results are passed to `consume` in the calling thread in completion order.
/// The first error stops the workers, and the function returns after all worker threads have finished.
///
/// # Errors
///
/// Returns an error if `concurrency` is zero.
/// Passes through the first error from the task or the record sources.
pub fn run_partitions<S1, S2, T, C>(
    dataset1: &S1, dataset2: &S2,
    partitions: Vec<Partition>, concurrency: usize,
    task: &T, mut consume: C
) -> Result<(), Error>
    where S1: RecordSource, S2: RecordSource, T: PartitionTask, C: FnMut(T::Output)
{
    if concurrency == 0 {
        return Err(Error::Configuration(String::from("Concurrency must be at least 1")));
    }
    let start_time = Instant::now();
    let total = partitions.len();
    if total == 0 {
        return Ok(());
    }
    let threads = concurrency.min(total);

    // The job queue is filled once and closed before the workers start.
    let (to_queue, from_queue) = mpsc::channel();
    for partition in partitions {
        // This cannot fail, as we still own the receiver.
        let _ = to_queue.send(partition);
    }
    drop(to_queue);
    let jobs = Mutex::new(from_queue);
    let abort = AtomicBool::new(false);
    let (to_consumer, from_workers) = mpsc::sync_channel(threads);

    let processed = thread::scope(|scope| {
        for worker_id in 0..threads {
            let to_consumer = to_consumer.clone();
            let jobs = &jobs;
            let abort = &abort;
            scope.spawn(move || {
                worker_thread(worker_id, dataset1, dataset2, task, jobs, abort, to_consumer);
            });
        }
        drop(to_consumer);
        // The receiver is dropped when this returns, which releases workers blocked on a full channel.
        consume_results(from_workers, &mut consume, &abort)
    })?;

    if processed != total {
        return Err(Error::RecordSource(format!(
            "Processed {} partitions out of {}", processed, total
        )));
    }
    log::info!(
        "Processed {} partitions with {} threads in {:.3} seconds",
        total, threads, start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

//-----------------------------------------------------------------------------

type Message<T> = Result<T, Error>;

// Takes partitions from the queue until the queue is empty, the computation is aborted, or the consumer is gone.
fn worker_thread<S1: RecordSource, S2: RecordSource, T: PartitionTask>(
    worker_id: usize,
    dataset1: &S1, dataset2: &S2, task: &T,
    jobs: &Mutex<mpsc::Receiver<Partition>>,
    abort: &AtomicBool,
    to_consumer: mpsc::SyncSender<Message<T::Output>>
) {
    let readers = dataset1.reader().and_then(|reader1| {
        dataset2.reader().map(|reader2| (reader1, reader2))
    });
    let (mut reader1, mut reader2) = match readers {
        Ok(readers) => readers,
        Err(err) => {
            abort.store(true, Ordering::SeqCst);
            let _ = to_consumer.send(Err(err));
            return;
        }
    };

    loop {
        if abort.load(Ordering::SeqCst) {
            return;
        }
        let job = match jobs.lock() {
            Ok(queue) => queue.recv().ok(),
            Err(_) => None,
        };
        let partition = match job {
            Some(partition) => partition,
            None => return,
        };

        log::debug!(
            "Worker {}: reference {}, orientation {}",
            worker_id, partition.reference.name, partition.orientation
        );
        let result = task.process(&mut reader1, &mut reader2, &partition);
        let failed = result.is_err();
        if failed {
            abort.store(true, Ordering::SeqCst);
        }
        if to_consumer.send(result).is_err() || failed {
            return;
        }
    }
}

// Passes results to the consumer until all workers have finished. Stops at the first error.
// Returns the number of results.
fn consume_results<O, C: FnMut(O)>(
    from_workers: mpsc::Receiver<Message<O>>,
    consume: &mut C,
    abort: &AtomicBool
) -> Result<usize, Error> {
    let mut processed = 0;
    for message in from_workers.iter() {
        match message {
            Ok(result) => {
                consume(result);
                processed += 1;
            },
            Err(err) => {
                abort.store(true, Ordering::SeqCst);
                return Err(err);
            },
        }
    }
    Ok(processed)
}

//-----------------------------------------------------------------------------
