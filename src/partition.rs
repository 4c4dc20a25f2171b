//! Independent units of work for the relative position computation.

use crate::{Error, Orientation, RecordSource, Reference};

use std::collections::BTreeMap;

//-----------------------------------------------------------------------------

/// Reads aligned to one reference sequence in one orientation.
///
/// Partitions are processed independently, and no two workers ever process the same partition.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Partition {
    /// Reference sequence.
    pub reference: Reference,
    /// Orientation of the reads in dataset 2.
    pub orientation: Orientation,
}

impl Partition {
    /// Creates a new partition.
    pub fn new(reference: Reference, orientation: Orientation) -> Self {
        Partition { reference, orientation }
    }
}

//-----------------------------------------------------------------------------

/// Merges two reference catalogs into their union sorted by name.
///
/// If both catalogs contain a reference with the same name, the merged catalog uses the larger length.
pub fn merge_references(first: &[Reference], second: &[Reference]) -> Vec<Reference> {
    let mut lengths: BTreeMap<&str, usize> = BTreeMap::new();
    for reference in first.iter().chain(second.iter()) {
        let length = lengths.entry(&reference.name).or_insert(0);
        *length = (*length).max(reference.length);
    }
    lengths.into_iter().map(|(name, length)| Reference::new(name, length)).collect()
}

/// Returns the partitions for the given references: every reference in both orientations.
pub fn partitions(references: &[Reference]) -> Vec<Partition> {
    references.iter().flat_map(|reference| {
        Orientation::BOTH.into_iter().map(move |orientation| Partition::new(reference.clone(), orientation))
    }).collect()
}

/// Reads the reference catalogs of both datasets and returns the merged catalog.
///
/// Passes through any errors from the record sources.
pub fn reference_catalog<S1: RecordSource, S2: RecordSource>(dataset1: &S1, dataset2: &S2) -> Result<Vec<Reference>, Error> {
    let references1 = dataset1.references()?;
    let references2 = dataset2.references()?;
    let merged = merge_references(&references1, &references2);
    log::info!(
        "Found {} references in dataset 1, {} in dataset 2, {} in total",
        references1.len(), references2.len(), merged.len()
    );
    Ok(merged)
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
