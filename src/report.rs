//! Reporting merged relative positions as tables.
//!
//! The results are passed row by row to a [`ReportSink`].
//! Each row contains the offset, the number of pairs at that offset, and the read counts for the datasets.
//! The read counts are the same for every row of the same table or reference.
//! [`TableWriter`] writes the rows as tab-delimited text.
//!
//! Read length distributions are written with [`write_size_distribution`].

use crate::{Error, ReadCount, RelativePositions, Summary};

use std::io::Write;

//-----------------------------------------------------------------------------

/// A receiver for the rows of a relative position report.
pub trait ReportSink {
    /// Called once before any rows in aggregate mode.
    fn begin_aggregate(&mut self) -> Result<(), Error>;

    /// Called once before any rows in grouped mode.
    fn begin_grouped(&mut self) -> Result<(), Error>;

    /// Receives a row in aggregate mode.
    fn aggregate_row(&mut self, offset: isize, pairs: u64, read_count1: usize, read_count2: usize) -> Result<(), Error>;

    /// Receives a row for the given reference in grouped mode.
    fn grouped_row(&mut self, reference: &str, offset: isize, pairs: u64, read_count1: usize, read_count2: usize) -> Result<(), Error>;

    /// Called after the last row.
    fn finish(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Passes the results to the sink.
///
/// Each histogram produces one row per offset from `-span` to `span` in increasing order.
/// In grouped mode, references are reported in name order.
///
/// # Errors
///
/// Passes through any errors from the sink.
pub fn write_report<S: ReportSink>(result: &RelativePositions, sink: &mut S) -> Result<(), Error> {
    match result {
        RelativePositions::Aggregate(summary) => {
            sink.begin_aggregate()?;
            for (offset, pairs) in summary.histogram.iter() {
                sink.aggregate_row(offset, pairs, summary.read_count1, summary.read_count2)?;
            }
        },
        RelativePositions::Grouped(summaries) => {
            sink.begin_grouped()?;
            for (reference, summary) in summaries.iter() {
                write_group(reference, summary, sink)?;
            }
        },
    }
    sink.finish()
}

fn write_group<S: ReportSink>(reference: &str, summary: &Summary, sink: &mut S) -> Result<(), Error> {
    for (offset, pairs) in summary.histogram.iter() {
        sink.grouped_row(reference, offset, pairs, summary.read_count1, summary.read_count2)?;
    }
    Ok(())
}

//-----------------------------------------------------------------------------

/// Writes the report as a tab-delimited table with a header line.
///
/// # Examples
///
/// ```
/// use htsdb::{write_report, RelativePositions, Summary, TableWriter};
///
/// let mut summary = Summary::new(1);
/// summary.histogram.add(-1, 2);
/// summary.read_count1 = 2;
/// summary.read_count2 = 1;
///
/// let mut writer = TableWriter::new(Vec::new());
/// write_report(&RelativePositions::Aggregate(summary), &mut writer).unwrap();
/// let text = String::from_utf8(writer.into_inner()).unwrap();
/// assert_eq!(text, "pos\tpairs\treadCount1\treadCount2\n-1\t2\t2\t1\n0\t0\t2\t1\n1\t0\t2\t1\n");
/// ```
pub struct TableWriter<W: Write> {
    output: W,
}

impl<W: Write> TableWriter<W> {
    /// Header line in aggregate mode.
    pub const AGGREGATE_HEADER: &'static str = "pos\tpairs\treadCount1\treadCount2";

    /// Header line in grouped mode.
    pub const GROUPED_HEADER: &'static str = "ref\tpos\tpairs\treadCount1\treadCount2";

    /// Creates a new writer.
    pub fn new(output: W) -> Self {
        TableWriter { output }
    }

    /// Returns the output.
    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> ReportSink for TableWriter<W> {
    fn begin_aggregate(&mut self) -> Result<(), Error> {
        writeln!(self.output, "{}", Self::AGGREGATE_HEADER)?;
        Ok(())
    }

    fn begin_grouped(&mut self) -> Result<(), Error> {
        writeln!(self.output, "{}", Self::GROUPED_HEADER)?;
        Ok(())
    }

    fn aggregate_row(&mut self, offset: isize, pairs: u64, read_count1: usize, read_count2: usize) -> Result<(), Error> {
        writeln!(self.output, "{}\t{}\t{}\t{}", offset, pairs, read_count1, read_count2)?;
        Ok(())
    }

    fn grouped_row(&mut self, reference: &str, offset: isize, pairs: u64, read_count1: usize, read_count2: usize) -> Result<(), Error> {
        writeln!(self.output, "{}\t{}\t{}\t{}\t{}", reference, offset, pairs, read_count1, read_count2)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.output.flush()?;
        Ok(())
    }
}

//-----------------------------------------------------------------------------

/// Header line for [`write_size_distribution`].
pub const SIZE_DISTRIBUTION_HEADER: &str = "category\tlen\tcount\tcopyNumber";

/// Writes a read length distribution as tab-delimited text.
///
/// Row `i` contains the counts for read length `i`, as returned by [`crate::Dataset::size_distribution`].
/// Every row starts with `label`.
///
/// # Examples
///
/// ```
/// use htsdb::{write_size_distribution, ReadCount};
///
/// let sizes = vec![ReadCount::default(), ReadCount { reads: 2, copies: 5 }];
/// let mut output = Vec::new();
/// write_size_distribution(&sizes, "all", false, &mut output).unwrap();
/// assert_eq!(String::from_utf8(output).unwrap(), "all\t0\t0\t0\nall\t1\t2\t5\n");
/// ```
pub fn write_size_distribution<W: Write>(sizes: &[ReadCount], label: &str, header: bool, output: &mut W) -> Result<(), Error> {
    if header {
        writeln!(output, "{}", SIZE_DISTRIBUTION_HEADER)?;
    }
    for (len, count) in sizes.iter().enumerate() {
        writeln!(output, "{}\t{}\t{}\t{}", label, len, count.reads, count.copies)?;
    }
    output.flush()?;
    Ok(())
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
