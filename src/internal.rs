use crate::{Dataset, Interval, MemoryDataset, Orientation};
use crate::utils;

use std::path::PathBuf;

//-----------------------------------------------------------------------------

// Building test records.

pub(crate) fn interval(start: usize, end: usize, orientation: Orientation, weight: u64) -> Interval {
    let result = Interval::new(start, end, orientation, weight);
    assert!(result.is_ok(), "Failed to create interval [{}, {}): {}", start, end, result.unwrap_err());
    result.unwrap()
}

pub(crate) fn forward(start: usize, end: usize) -> Interval {
    interval(start, end, Orientation::Forward, 1)
}

pub(crate) fn reverse(start: usize, end: usize) -> Interval {
    interval(start, end, Orientation::Reverse, 1)
}

pub(crate) fn memory_dataset(records: &[(&str, Interval)]) -> MemoryDataset {
    records.iter().map(|(name, interval)| (name.to_string(), *interval)).collect()
}

// Returns the same records with every strand flipped.
pub(crate) fn flip_strands(dataset: &MemoryDataset) -> MemoryDataset {
    dataset.iter().map(|(name, interval)| {
        let mut flipped = *interval;
        flipped.orientation = interval.orientation.flip();
        (name.to_string(), flipped)
    }).collect()
}

//-----------------------------------------------------------------------------

// SQLite datasets.

pub(crate) fn create_database(prefix: &str, tables: &[(&str, &MemoryDataset)]) -> PathBuf {
    let db_file = utils::temp_file_name(prefix);
    assert!(!utils::file_exists(&db_file), "Database {} already exists", db_file.display());
    for (table, records) in tables {
        let records = records.iter().map(|(name, interval)| (name.to_string(), *interval));
        let result = Dataset::create(records, &db_file, table);
        assert!(result.is_ok(), "Failed to create table {}: {}", table, result.unwrap_err());
    }
    db_file
}

pub(crate) fn open_dataset(db_file: &PathBuf, table: &str, filter: Option<&str>) -> Dataset {
    let dataset = Dataset::open(db_file, table, filter);
    assert!(dataset.is_ok(), "Failed to open table {} in {}: {}", table, db_file.display(), dataset.unwrap_err());
    dataset.unwrap()
}

//-----------------------------------------------------------------------------
