//! Utility functions.

use crate::Error;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::io::{BufRead, BufReader, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::{env, process};

use flate2::read::MultiGzDecoder;

//-----------------------------------------------------------------------------

// Utilities for working with files.

const SIZE_UNITS: [(f64, &str); 5] = [
    (1.0, "B"),
    (1024.0, "KiB"),
    (1024.0 * 1024.0, "MiB"),
    (1024.0 * 1024.0 * 1024.0, "GiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0, "TiB"),
];

/// Returns a human-readable representation of the given number of bytes.
pub fn human_readable_size(bytes: usize) -> String {
    let mut unit = 0;
    let value = bytes as f64;
    while unit + 1 < SIZE_UNITS.len() && value >= SIZE_UNITS[unit + 1].0 {
        unit += 1;
    }
    format!("{:.3} {}", value / SIZE_UNITS[unit].0, SIZE_UNITS[unit].1)
}

/// Returns a human-readable size of the file, or [`None`] if the file cannot be accessed.
pub fn file_size<P: AsRef<Path>>(filename: P) -> Option<String> {
    let metadata = fs::metadata(filename).ok()?;
    Some(human_readable_size(metadata.len() as usize))
}

/// Returns `true` if the file exists.
pub fn file_exists<P: AsRef<Path>>(filename: P) -> bool {
    fs::metadata(filename).is_ok()
}

/// Returns a name for a temporary file in the system temporary directory.
///
/// The name contains the prefix, the process id, and a counter, so that it is unique within the process.
/// The file itself is not created.
pub fn temp_file_name(prefix: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let count = COUNTER.fetch_add(1, Ordering::SeqCst);
    env::temp_dir().join(format!("{}-{}-{}.db", prefix, process::id(), count))
}

/// Returns `true` if the file appears to be gzip-compressed.
pub fn is_gzipped<P: AsRef<Path>>(filename: P) -> bool {
    let file = match File::open(filename) {
        Ok(file) => file,
        Err(_) => return false,
    };
    let mut reader = BufReader::new(file);
    let mut magic = [0; 2];
    let len = reader.read(&mut magic).ok();
    len == Some(2) && magic == [0x1F, 0x8B]
}

/// Returns a buffered reader for the file, which may be gzip-compressed.
pub fn open_file<P: AsRef<Path>>(filename: P) -> Result<Box<dyn BufRead>, Error> {
    let file = File::open(&filename)?;
    let inner = BufReader::new(file);
    if is_gzipped(&filename) {
        let inner = MultiGzDecoder::new(inner);
        Ok(Box::new(BufReader::new(inner)))
    } else {
        Ok(Box::new(inner))
    }
}

//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn readable_sizes() {
        assert_eq!(human_readable_size(0), "0.000 B");
        assert_eq!(human_readable_size(1023), "1023.000 B");
        assert_eq!(human_readable_size(1024), "1.000 KiB");
        assert_eq!(human_readable_size(3 * 1024 * 1024 / 2), "1.500 MiB");
    }

    #[test]
    fn unique_temp_names() {
        let first = temp_file_name("utils");
        let second = temp_file_name("utils");
        assert_ne!(first, second, "Temporary file names are not unique");
        assert!(!file_exists(&first), "Temporary file {} was created", first.display());
    }

    #[test]
    fn plain_and_gzipped_files() {
        let content = "chr1\t+\t10\t19\n";

        let plain = temp_file_name("utils-plain");
        fs::write(&plain, content).unwrap();
        assert!(!is_gzipped(&plain), "Plain file was detected as gzipped");

        let gzipped = temp_file_name("utils-gz");
        let mut encoder = GzEncoder::new(File::create(&gzipped).unwrap(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
        assert!(is_gzipped(&gzipped), "Gzipped file was not detected");

        for filename in [&plain, &gzipped] {
            let mut reader = open_file(filename).unwrap();
            let mut buf = String::new();
            reader.read_to_string(&mut buf).unwrap();
            assert_eq!(buf, content, "Wrong content in {}", filename.display());
            fs::remove_file(filename).unwrap();
        }
    }
}

//-----------------------------------------------------------------------------
