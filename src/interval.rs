//! Aligned read intervals, strand orientations, and reference points on the intervals.

use crate::Error;

use std::fmt::Display;
use std::str::FromStr;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Orientation of an aligned read on the reference sequence.
///
/// The database stores the orientation as an integer strand: `1` for forward and `-1` for reverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    /// Same orientation as the reference sequence.
    Forward,
    /// Reverse complement of the reference sequence.
    Reverse,
}

impl Orientation {
    /// Both orientations, forward first.
    pub const BOTH: [Orientation; 2] = [Orientation::Forward, Orientation::Reverse];

    /// Returns the other orientation.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reverse,
            Orientation::Reverse => Orientation::Forward,
        }
    }

    /// Returns `1` for forward and `-1` for reverse.
    #[inline]
    pub fn sign(self) -> isize {
        match self {
            Orientation::Forward => 1,
            Orientation::Reverse => -1,
        }
    }

    /// Returns the strand value used in the database.
    #[inline]
    pub fn strand(self) -> i64 {
        self.sign() as i64
    }

    /// Converts a stored strand value into an orientation.
    ///
    /// Any value other than `1` or `-1` means that the record is corrupted.
    pub fn from_strand(strand: i64) -> Result<Self, Error> {
        match strand {
            1 => Ok(Orientation::Forward),
            -1 => Ok(Orientation::Reverse),
            _ => Err(Error::InvariantViolation(format!("Strand is not 1 or -1: {}", strand))),
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Forward => write!(f, "+"),
            Orientation::Reverse => write!(f, "-"),
        }
    }
}

//-----------------------------------------------------------------------------

/// The end of an interval used as its reference point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PositionEnd {
    /// The 5' end.
    #[default]
    Head,
    /// The 3' end.
    Tail,
}

impl FromStr for PositionEnd {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5p" | "head" => Ok(PositionEnd::Head),
            "3p" | "tail" => Ok(PositionEnd::Tail),
            _ => Err(Error::Configuration(format!("Reference point must be 5p or 3p, got {}", s))),
        }
    }
}

impl Display for PositionEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionEnd::Head => write!(f, "5p"),
            PositionEnd::Tail => write!(f, "3p"),
        }
    }
}

//-----------------------------------------------------------------------------

/// An aligned read on a reference sequence.
///
/// The interval is half-open: `start` is the first aligned position and `end` is one past the last.
/// Weight is the copy number of the read, or the number of identical reads collapsed into the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    /// First aligned position (0-based).
    pub start: usize,
    /// One past the last aligned position.
    pub end: usize,
    /// Orientation of the alignment.
    pub orientation: Orientation,
    /// Copy number.
    pub weight: u64,
}

impl Interval {
    /// Creates a new interval, checking that it is non-empty and has a positive weight.
    pub fn new(start: usize, end: usize, orientation: Orientation, weight: u64) -> Result<Self, Error> {
        if end <= start {
            return Err(Error::InvariantViolation(format!("Empty interval [{}, {})", start, end)));
        }
        if weight == 0 {
            return Err(Error::InvariantViolation(format!("Zero copy number for interval [{}, {})", start, end)));
        }
        Ok(Interval { start, end, orientation, weight })
    }

    /// Converts a stored `(strand, start, stop, copy_number)` tuple into an interval.
    ///
    /// The stored stop coordinate is inclusive.
    pub fn from_stored(strand: i64, start: i64, stop: i64, copy_number: i64) -> Result<Self, Error> {
        let orientation = Orientation::from_strand(strand)?;
        if start < 0 {
            return Err(Error::InvariantViolation(format!("Negative start coordinate: {}", start)));
        }
        if stop < start {
            return Err(Error::InvariantViolation(format!("Stop {} is before start {}", stop, start)));
        }
        if copy_number < 1 {
            return Err(Error::InvariantViolation(format!("Invalid copy number: {}", copy_number)));
        }
        Self::new(start as usize, stop as usize + 1, orientation, copy_number as u64)
    }

    /// Returns the reference point of the interval when read in the given orientation.
    ///
    /// The head of a forward interval is its first position and the head of a reverse interval is its last position.
    /// Tails are mirrored.
    #[inline]
    pub fn position(&self, orientation: Orientation, end: PositionEnd) -> usize {
        match (end, orientation) {
            (PositionEnd::Head, Orientation::Forward) | (PositionEnd::Tail, Orientation::Reverse) => self.start,
            (PositionEnd::Head, Orientation::Reverse) | (PositionEnd::Tail, Orientation::Forward) => self.end - 1,
        }
    }
}

//-----------------------------------------------------------------------------

/// A reference sequence that reads align to.
///
/// The length is derived from the data as the maximal end coordinate of the reads.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference {
    /// Name of the reference sequence.
    pub name: String,
    /// Length of the reference sequence.
    pub length: usize,
}

impl Reference {
    /// Creates a new reference.
    pub fn new(name: &str, length: usize) -> Self {
        Reference { name: name.to_string(), length }
    }
}

//-----------------------------------------------------------------------------
