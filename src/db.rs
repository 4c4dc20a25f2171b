//! Aligned reads stored in a table of a SQLite database.
//!
//! Each row of the table is one aligned read, or a group of identical reads, with columns
//!
//! * `rname`: name of the reference sequence,
//! * `strand`: `1` for forward and `-1` for reverse,
//! * `start`: 0-based first aligned position,
//! * `stop`: 0-based last aligned position (inclusive),
//! * `copy_number`: number of reads collapsed into the row.
//!
//! Other columns may be present and can be used in SQL filters.
//! A database may contain several tables, one per sample.

use crate::{Error, Interval, IntervalReader, Orientation, RecordSource, Reference};
use crate::utils;

use std::io::BufRead;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};


//-----------------------------------------------------------------------------

/// A table of aligned reads in a SQLite database, optionally restricted by a SQL filter.
///
/// The structure only stores the location of the data.
/// Each [`DatasetReader`] opens its own read-only connection, so that worker threads never share a connection or a cursor.
/// The filter is injected verbatim into the `WHERE` clause of every query and applies to all counts.
///
/// # Examples
///
/// ```
/// use htsdb::{Dataset, Interval, Orientation, RecordSource, Reference};
/// use htsdb::utils;
/// use std::fs;
///
/// let db_file = utils::temp_file_name("dataset");
/// let records = vec![
///     (String::from("chr1"), Interval::new(10, 20, Orientation::Forward, 2).unwrap()),
///     (String::from("chr1"), Interval::new(15, 30, Orientation::Reverse, 1).unwrap()),
///     (String::from("chr2"), Interval::new(0, 5, Orientation::Forward, 1).unwrap()),
/// ];
/// let inserted = Dataset::create(records, &db_file, Dataset::DEFAULT_TABLE).unwrap();
/// assert_eq!(inserted, 3);
///
/// // All reads.
/// let dataset = Dataset::open(&db_file, Dataset::DEFAULT_TABLE, None).unwrap();
/// let references = dataset.references().unwrap();
/// assert_eq!(references, vec![Reference::new("chr1", 30), Reference::new("chr2", 5)]);
/// assert_eq!(dataset.count_reads().unwrap().reads, 3);
///
/// // Only reads with a copy number above 1.
/// let filtered = Dataset::open(&db_file, Dataset::DEFAULT_TABLE, Some("copy_number > 1")).unwrap();
/// assert_eq!(filtered.references().unwrap(), vec![Reference::new("chr1", 20)]);
///
/// drop(dataset);
/// drop(filtered);
/// fs::remove_file(&db_file).unwrap();
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dataset {
    filename: PathBuf,
    table: String,
    filter: Option<String>,
}

/// Using the dataset.
impl Dataset {
    /// Default table name.
    pub const DEFAULT_TABLE: &'static str = "sample";

    /// Opens a dataset in the given database file and table.
    ///
    /// An empty filter is the same as no filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the table name is not a valid identifier or if the table does not exist.
    /// Passes through any database errors.
    pub fn open<P: AsRef<Path>>(filename: P, table: &str, filter: Option<&str>) -> Result<Self, Error> {
        check_table_name(table)?;
        let filter = filter.map(|x| x.trim()).filter(|x| !x.is_empty()).map(String::from);
        let dataset = Dataset {
            filename: filename.as_ref().to_path_buf(),
            table: table.to_string(),
            filter,
        };

        let connection = dataset.connect()?;
        let exists: bool = connection.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            (&dataset.table,),
            |row| row.get(0)
        )?;
        if !exists {
            return Err(Error::Configuration(format!(
                "Table {} does not exist in database {}", dataset.table, dataset.filename.display()
            )));
        }

        Ok(dataset)
    }

    /// Returns the name of the database file.
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Returns the name of the table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the SQL filter, if there is one.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    // Opens a new read-only connection to the database.
    fn connect(&self) -> Result<Connection, Error> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Connection::open_with_flags(&self.filename, flags).map_err(|x| {
            Error::RecordSource(format!("Cannot open database {}: {}", self.filename.display(), x))
        })
    }

    // Returns a WHERE clause combining the filter with the given condition.
    fn where_clause(&self, condition: Option<&str>) -> String {
        match (&self.filter, condition) {
            (Some(filter), Some(condition)) => format!("WHERE ({}) AND {}", filter, condition),
            (Some(filter), None) => format!("WHERE ({})", filter),
            (None, Some(condition)) => format!("WHERE {}", condition),
            (None, None) => String::new(),
        }
    }

    // Query for the intervals in one partition. Parameters are strand and reference name.
    fn interval_query(&self) -> String {
        format!(
            "SELECT strand, start, stop, copy_number FROM \"{}\" {}",
            self.table, self.where_clause(Some("strand = ?1 AND rname = ?2"))
        )
    }

    /// Returns the number of reads and their total copy number.
    ///
    /// The filter applies to the counts.
    /// Passes through any database errors.
    pub fn count_reads(&self) -> Result<ReadCount, Error> {
        let connection = self.connect()?;
        let query = format!(
            "SELECT COUNT(*), COALESCE(SUM(copy_number), 0) FROM \"{}\" {}",
            self.table, self.where_clause(None)
        );
        let (reads, copies): (i64, i64) = connection.query_row(&query, (), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        Ok(ReadCount { reads: reads as usize, copies: copies as u64 })
    }

    /// Returns the number of reads and their total copy number for each read length.
    ///
    /// The read length is `stop - start + 1`.
    /// Item `i` of the result contains the counts for length `i`, from `0` to the maximal length.
    /// Lengths without reads have zero counts.
    /// The result is empty if there are no reads.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored read has a non-positive length.
    /// Passes through any database errors.
    pub fn size_distribution(&self) -> Result<Vec<ReadCount>, Error> {
        let connection = self.connect()?;
        let query = format!(
            "SELECT stop - start + 1 AS len, COUNT(*), COALESCE(SUM(copy_number), 0) FROM \"{}\" {} GROUP BY len ORDER BY len",
            self.table, self.where_clause(None)
        );
        let mut statement = connection.prepare(&query)?;
        let mut rows = statement.query(())?;
        let mut result: Vec<ReadCount> = Vec::new();
        while let Some(row) = rows.next()? {
            let len: i64 = row.get(0)?;
            let reads: i64 = row.get(1)?;
            let copies: i64 = row.get(2)?;
            if len <= 0 {
                return Err(Error::InvariantViolation(format!("Invalid read length {}", len)));
            }
            let len = len as usize;
            result.resize(len, ReadCount::default());
            result.push(ReadCount { reads: reads as usize, copies: copies as u64 });
        }
        Ok(result)
    }
}

impl RecordSource for Dataset {
    type Reader<'a> = DatasetReader;

    fn reader(&self) -> Result<Self::Reader<'_>, Error> {
        DatasetReader::new(self)
    }

    fn references(&self) -> Result<Vec<Reference>, Error> {
        let connection = self.connect()?;
        let query = format!(
            "SELECT rname, MAX(stop) + 1 FROM \"{}\" {} GROUP BY rname ORDER BY rname",
            self.table, self.where_clause(None)
        );
        let mut statement = connection.prepare(&query)?;
        let mut rows = statement.query(())?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let length: i64 = row.get(1)?;
            if length <= 0 {
                return Err(Error::InvariantViolation(format!("Invalid length {} for reference {}", length, name)));
            }
            result.push(Reference { name, length: length as usize });
        }
        Ok(result)
    }
}

//-----------------------------------------------------------------------------

/// Creating the dataset.
impl Dataset {
    /// Creates a new table from a tab-delimited file and returns the number of inserted records.
    ///
    /// Each line of the input contains fields `rname`, `strand`, `start`, `stop`, and optionally `copy_number` (default 1).
    /// Strand is `+`, `-`, `1`, or `-1`.
    /// Coordinates are 0-based and `stop` is inclusive.
    /// Empty lines and lines starting with `#` are skipped.
    /// The input may be gzip-compressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the table already exists or if a line cannot be parsed.
    /// Passes through any database errors.
    pub fn create_from_file<P: AsRef<Path>, Q: AsRef<Path>>(input_file: P, db_file: Q, table: &str) -> Result<usize, Error> {
        log::info!("Reading records from {}", input_file.as_ref().display());
        let reader = utils::open_file(&input_file)?;
        Self::insert_records(parse_records(reader), db_file, table)
    }

    /// Creates a new table from the given records and returns the number of inserted records.
    ///
    /// The database file is created if it does not exist.
    /// The table is indexed by `(rname, strand)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the table name is invalid or the table already exists.
    /// Passes through any database errors.
    pub fn create<I, P>(records: I, db_file: P, table: &str) -> Result<usize, Error>
        where I: IntoIterator<Item = (String, Interval)>, P: AsRef<Path>
    {
        Self::insert_records(records.into_iter().map(Ok), db_file, table)
    }

    // Creates the table, the index, and the records in a single transaction.
    // If any record fails, nothing is committed.
    fn insert_records<I, P>(records: I, db_file: P, table: &str) -> Result<usize, Error>
        where I: IntoIterator<Item = Result<(String, Interval), Error>>, P: AsRef<Path>
    {
        check_table_name(table)?;
        log::info!("Creating table {} in database {}", table, db_file.as_ref().display());

        let mut connection = Connection::open(db_file)?;
        let mut inserted = 0;
        let transaction = connection.transaction()?;
        transaction.execute(
            &format!(
                "CREATE TABLE \"{}\" (
                    rname TEXT NOT NULL,
                    strand INTEGER NOT NULL,
                    start INTEGER NOT NULL,
                    stop INTEGER NOT NULL,
                    copy_number INTEGER NOT NULL
                )",
                table
            ),
            (),
        )?;
        transaction.execute(
            &format!("CREATE INDEX \"{}_rname_strand\" ON \"{}\"(rname, strand)", table, table),
            (),
        )?;
        {
            let mut insert = transaction.prepare(&format!(
                "INSERT INTO \"{}\"(rname, strand, start, stop, copy_number) VALUES (?1, ?2, ?3, ?4, ?5)",
                table
            ))?;
            for record in records {
                let (rname, interval) = record?;
                insert.execute((
                    rname,
                    interval.orientation.strand(),
                    interval.start as i64,
                    (interval.end - 1) as i64,
                    interval.weight as i64,
                ))?;
                inserted += 1;
            }
        }
        transaction.commit()?;

        log::info!("Inserted {} records", inserted);
        Ok(inserted)
    }
}

//-----------------------------------------------------------------------------

/// A per-thread reader for a [`Dataset`].
///
/// The reader owns a read-only database connection and caches the prepared interval query.
#[derive(Debug)]
pub struct DatasetReader {
    connection: Connection,
    query: String,
}

impl DatasetReader {
    /// Opens a new connection to the dataset.
    ///
    /// Passes through any database errors.
    pub fn new(dataset: &Dataset) -> Result<Self, Error> {
        let connection = dataset.connect()?;
        let query = dataset.interval_query();
        // Fail early if the query is invalid, e.g. because of a broken filter.
        connection.prepare_cached(&query)?;
        Ok(DatasetReader { connection, query })
    }
}

impl IntervalReader for DatasetReader {
    fn for_each_interval<F: FnMut(Interval)>(&mut self, reference: &str, orientation: Orientation, mut f: F) -> Result<(), Error> {
        let mut statement = self.connection.prepare_cached(&self.query)?;
        let mut rows = statement.query((orientation.strand(), reference))?;
        while let Some(row) = rows.next()? {
            let interval = Interval::from_stored(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)?;
            f(interval);
        }
        Ok(())
    }
}

//-----------------------------------------------------------------------------

/// Number of reads in a dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadCount {
    /// Number of records.
    pub reads: usize,
    /// Total copy number over the records.
    pub copies: u64,
}

//-----------------------------------------------------------------------------

// Table names are inserted into queries, so they must be plain identifiers.
fn check_table_name(table: &str) -> Result<(), Error> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(c) => (c.is_ascii_alphabetic() || c == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::Configuration(format!("Invalid table name: {:?}", table)))
    }
}

// Parses a record from a tab-delimited line.
fn parse_record(line: &str) -> Result<(String, Interval), String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 4 {
        return Err(format!("Expected at least 4 fields, found {}", fields.len()));
    }
    let strand: i64 = match fields[1] {
        "+" => 1,
        "-" => -1,
        s => s.parse().map_err(|_| format!("Invalid strand: {}", s))?,
    };
    let start: i64 = fields[2].parse().map_err(|_| format!("Invalid start: {}", fields[2]))?;
    let stop: i64 = fields[3].parse().map_err(|_| format!("Invalid stop: {}", fields[3]))?;
    let copy_number: i64 = match fields.get(4) {
        Some(s) => s.parse().map_err(|_| format!("Invalid copy number: {}", s))?,
        None => 1,
    };
    let interval = Interval::from_stored(strand, start, stop, copy_number).map_err(|x| x.to_string())?;
    Ok((fields[0].to_string(), interval))
}

// Parses the records from the reader lazily, skipping empty lines and comments.
fn parse_records(reader: Box<dyn BufRead>) -> impl Iterator<Item = Result<(String, Interval), Error>> {
    reader.lines().enumerate().filter_map(|(line_num, line)| {
        let line = match line {
            Ok(line) => line,
            Err(err) => return Some(Err(Error::from(err))),
        };
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        Some(parse_record(line).map_err(|x| {
            Error::InvariantViolation(format!("Line {}: {}", line_num + 1, x))
        }))
    })
}

//-----------------------------------------------------------------------------
