use super::*;

use crate::{internal, Interval, MemoryDataset, PositionEnd, RecordSource, Reference};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//-----------------------------------------------------------------------------

fn partition(name: &str, orientation: Orientation) -> Partition {
    Partition::new(Reference::new(name, 1000), orientation)
}

fn params(span: usize) -> RelPosParams {
    RelPosParams { span, ..RelPosParams::default() }
}

fn process(dataset1: &MemoryDataset, dataset2: &MemoryDataset, partition: &Partition, params: &RelPosParams) -> PartitionResult {
    let reader1 = dataset1.reader().unwrap();
    let reader2 = dataset2.reader().unwrap();
    let mut worker = PartitionWorker::new(reader1, reader2, params);
    let result = worker.process(partition);
    assert!(result.is_ok(), "Failed to process partition {:?}: {}", partition, result.unwrap_err());
    result.unwrap()
}

// Checks that the histogram has a single non-zero count.
fn check_single_count(result: &PartitionResult, offset: isize, count: u64) {
    for (o, c) in result.histogram.iter() {
        let expected = if o == offset { count } else { 0 };
        assert_eq!(c, expected, "Wrong count at offset {}", o);
    }
}

fn random_dataset(rng: &mut StdRng, name: &str, records: usize, max_weight: u64) -> MemoryDataset {
    let mut dataset = MemoryDataset::new();
    for _ in 0..records {
        let start = rng.gen_range(0..200);
        let len = rng.gen_range(1..30);
        let orientation = if rng.gen_bool(0.5) { Orientation::Forward } else { Orientation::Reverse };
        let weight = rng.gen_range(1..=max_weight);
        dataset.insert(name, internal::interval(start, start + len, orientation, weight));
    }
    dataset
}

//-----------------------------------------------------------------------------

#[test]
fn weighted_index() {
    let mut index = WeightedIndex::new();
    assert!(index.is_empty());
    assert!(index.insert(10, 3, false));
    assert!(index.insert(10, 2, false));
    assert!(index.insert(12, 1, false));
    assert_eq!(index.get(10), 5);
    assert_eq!(index.get(12), 1);
    assert_eq!(index.get(11), 0);
    assert_eq!(index.len(), 2);
    assert_eq!(index.max_weight(), 5);

    let mut collapsed = WeightedIndex::new();
    assert!(collapsed.insert(10, 3, true));
    assert!(!collapsed.insert(10, 2, true), "Duplicate position was counted");
    assert_eq!(collapsed.get(10), 1);
}

//-----------------------------------------------------------------------------

#[test]
fn single_pair_forward() {
    let dataset1 = internal::memory_dataset(&[("chr1", internal::forward(10, 11))]);
    let dataset2 = internal::memory_dataset(&[("chr1", internal::forward(12, 13))]);
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &params(5));
    assert_eq!(result.histogram.span(), 5);
    check_single_count(&result, -2, 1);
    assert_eq!(result.read_count1, 1);
    assert_eq!(result.read_count2, 1);
}

#[test]
fn single_pair_reverse() {
    // On the reverse strand, position 10 is downstream of position 12.
    let dataset1 = internal::memory_dataset(&[("chr1", internal::reverse(10, 11))]);
    let dataset2 = internal::memory_dataset(&[("chr1", internal::reverse(12, 13))]);
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Reverse), &params(5));
    check_single_count(&result, 2, 1);
    assert_eq!((result.read_count1, result.read_count2), (1, 1));

    // The forward partition does not see the reverse reads.
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &params(5));
    assert!(result.histogram.is_empty());
    assert_eq!((result.read_count1, result.read_count2), (0, 0));
}

#[test]
fn other_references_are_ignored() {
    let dataset1 = internal::memory_dataset(&[
        ("chr1", internal::forward(10, 11)),
        ("chr2", internal::forward(12, 13)),
    ]);
    let dataset2 = internal::memory_dataset(&[("chr1", internal::forward(12, 13))]);
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &params(5));
    check_single_count(&result, -2, 1);
}

#[test]
fn out_of_span() {
    let dataset1 = internal::memory_dataset(&[("chr1", internal::forward(10, 11))]);
    let dataset2 = internal::memory_dataset(&[("chr1", internal::forward(20, 21))]);
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &params(9));
    assert!(result.histogram.is_empty(), "Counted a pair outside the span");
    assert_eq!(result.read_count2, 1);

    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &params(10));
    check_single_count(&result, -10, 1);
}

#[test]
fn zero_span() {
    let dataset1 = internal::memory_dataset(&[("chr1", internal::forward(10, 11)), ("chr1", internal::forward(11, 12))]);
    let dataset2 = internal::memory_dataset(&[("chr1", internal::forward(10, 15))]);
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &params(0));
    assert_eq!(result.histogram.iter().collect::<Vec<_>>(), vec![(0, 1)]);
}

#[test]
fn negative_coordinates_are_skipped() {
    let dataset1 = internal::memory_dataset(&[("chr1", internal::forward(0, 1)), ("chr1", internal::forward(3, 4))]);
    let dataset2 = internal::memory_dataset(&[("chr1", internal::forward(1, 2)), ("chr1", internal::forward(0, 5))]);
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &params(5));
    // Dataset 2 points are 1 and 0.
    let mut truth = Histogram::new(5);
    truth.add(-1, 1);
    truth.add(2, 1);
    truth.add(0, 1);
    truth.add(3, 1);
    assert_eq!(result.histogram, truth);
    assert_eq!(result.read_count2, 2);
}

//-----------------------------------------------------------------------------

#[test]
fn head_and_tail() {
    // Forward [5, 11) has tail 10, reverse [10, 20) has head 19 and tail 10.
    let dataset1 = internal::memory_dataset(&[
        ("chr1", internal::forward(5, 11)),
        ("chr1", internal::reverse(10, 20)),
    ]);
    let dataset2 = internal::memory_dataset(&[
        ("chr1", internal::forward(12, 30)),
        ("chr1", internal::reverse(0, 13)),
    ]);

    let mut tail_head = params(5);
    tail_head.reference_point1 = PositionEnd::Tail;
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &tail_head);
    check_single_count(&result, -2, 1);

    // Reverse: dataset 1 point 10 against dataset 2 point 12.
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Reverse), &tail_head);
    check_single_count(&result, 2, 1);

    // Reverse heads: 19 against 12.
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Reverse), &params(10));
    check_single_count(&result, -7, 1);
}

#[test]
fn copy_numbers() {
    let dataset1 = internal::memory_dataset(&[
        ("chr1", internal::interval(10, 20, Orientation::Forward, 3)),
        ("chr1", internal::interval(10, 15, Orientation::Forward, 2)),
    ]);
    let dataset2 = internal::memory_dataset(&[("chr1", internal::interval(12, 13, Orientation::Forward, 7))]);

    // Copy numbers of dataset 1 are weights; copy numbers of dataset 2 are ignored.
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &params(5));
    check_single_count(&result, -2, 5);
    assert_eq!((result.read_count1, result.read_count2), (2, 1));

    let mut collapse = params(5);
    collapse.collapse1 = true;
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &collapse);
    check_single_count(&result, -2, 1);
    assert_eq!((result.read_count1, result.read_count2), (1, 1));
}

#[test]
fn collapse_dataset2() {
    let dataset1 = internal::memory_dataset(&[("chr1", internal::forward(10, 11))]);
    let dataset2 = internal::memory_dataset(&[
        ("chr1", internal::forward(12, 13)),
        ("chr1", internal::forward(12, 20)),
    ]);

    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &params(5));
    check_single_count(&result, -2, 2);
    assert_eq!(result.read_count2, 2);

    let mut collapse = params(5);
    collapse.collapse2 = true;
    let result = process(&dataset1, &dataset2, &partition("chr1", Orientation::Forward), &collapse);
    check_single_count(&result, -2, 1);
    assert_eq!(result.read_count2, 1);
}

#[test]
fn anti_sense() {
    let dataset1 = internal::memory_dataset(&[("chr1", internal::reverse(5, 11))]);
    let dataset2 = internal::memory_dataset(&[("chr1", internal::forward(12, 13))]);
    let partition = partition("chr1", Orientation::Forward);

    let result = process(&dataset1, &dataset2, &partition, &params(5));
    assert!(result.histogram.is_empty());
    assert_eq!((result.read_count1, result.read_count2), (0, 1));

    // The reverse read has head 10.
    let mut anti = params(5);
    anti.anti_sense = true;
    let result = process(&dataset1, &dataset2, &partition, &anti);
    check_single_count(&result, -2, 1);
    assert_eq!((result.read_count1, result.read_count2), (1, 1));
}

//-----------------------------------------------------------------------------

#[test]
fn histogram_bound() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let dataset1 = random_dataset(&mut rng, "chr1", 100, 5);
        let dataset2 = random_dataset(&mut rng, "chr1", 100, 5);
        for orientation in Orientation::BOTH {
            let partition = partition("chr1", orientation);
            let params = params(10);
            let reader1 = dataset1.reader().unwrap();
            let reader2 = dataset2.reader().unwrap();
            let mut worker = PartitionWorker::new(reader1, reader2, &params);
            let (index, _) = worker.index_dataset1(&partition).unwrap();
            let result = worker.process(&partition).unwrap();
            let bound = (result.read_count2 as u64) * (2 * params.span as u64 + 1) * index.max_weight();
            assert!(result.histogram.total() <= bound, "Histogram total {} exceeds the bound {}", result.histogram.total(), bound);
        }
    }
}

#[test]
fn collapse_without_duplicates() {
    let mut rng = StdRng::seed_from_u64(0xc011);
    for _ in 0..10 {
        // Distinct single-base positions with weight 1.
        let mut positions: Vec<usize> = (0..300).collect();
        positions.retain(|_| rng.gen_bool(0.3));
        let dataset1: MemoryDataset = positions.iter().map(|&pos| (String::from("chr1"), internal::forward(pos, pos + 1))).collect();
        let dataset2 = random_dataset(&mut rng, "chr1", 50, 3);

        let plain = params(20);
        let mut collapse = params(20);
        collapse.collapse1 = true;
        let partition = partition("chr1", Orientation::Forward);
        let first = process(&dataset1, &dataset2, &partition, &plain);
        let second = process(&dataset1, &dataset2, &partition, &collapse);
        assert_eq!(first, second, "Collapsing changed a dataset without duplicates");
    }
}

#[test]
fn anti_sense_equals_flipped_strands() {
    let mut rng = StdRng::seed_from_u64(0xa271);
    for _ in 0..10 {
        // Single-base intervals have the same reference point in both orientations.
        let mut dataset1 = MemoryDataset::new();
        for _ in 0..100 {
            let pos = rng.gen_range(0..200);
            let orientation = if rng.gen_bool(0.5) { Orientation::Forward } else { Orientation::Reverse };
            dataset1.insert("chr1", internal::interval(pos, pos + 1, orientation, rng.gen_range(1..4)));
        }
        let flipped = internal::flip_strands(&dataset1);
        let dataset2 = random_dataset(&mut rng, "chr1", 100, 3);

        let sense = params(15);
        let mut anti = params(15);
        anti.anti_sense = true;
        for orientation in Orientation::BOTH {
            let partition = partition("chr1", orientation);
            let with_anti = process(&dataset1, &dataset2, &partition, &anti);
            let with_flip = process(&flipped, &dataset2, &partition, &sense);
            assert_eq!(with_anti, with_flip, "Anti-sense differs from flipped strands in orientation {}", orientation);
        }
    }
}

//-----------------------------------------------------------------------------

// Compares the worker to a direct computation over all pairs.
#[test]
fn all_pairs() {
    let mut rng = StdRng::seed_from_u64(0xa11);
    let span = 25;
    let dataset1 = random_dataset(&mut rng, "chr1", 150, 4);
    let dataset2 = random_dataset(&mut rng, "chr1", 150, 4);
    for orientation in Orientation::BOTH {
        let partition = partition("chr1", orientation);
        let result = process(&dataset1, &dataset2, &partition, &params(span));

        let mut truth = Histogram::new(span);
        let select = |dataset: &MemoryDataset| -> Vec<Interval> {
            dataset.iter().filter(|(_, i)| i.orientation == orientation).map(|(_, i)| *i).collect()
        };
        for second in select(&dataset2) {
            let p2 = second.position(orientation, PositionEnd::Head) as isize;
            for first in select(&dataset1) {
                let p1 = first.position(orientation, PositionEnd::Head) as isize;
                let delta = p1 - p2;
                if delta.unsigned_abs() <= span {
                    truth.add(delta * orientation.sign(), first.weight);
                }
            }
        }
        assert_eq!(result.histogram, truth, "Wrong histogram in orientation {}", orientation);
    }
}

//-----------------------------------------------------------------------------
