use std::path::PathBuf;
use std::time::Instant;
use std::{env, process};

use htsdb::Dataset;
use htsdb::utils;

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Check if the table already exists.
    if utils::file_exists(&config.db_file) && Dataset::open(&config.db_file, &config.table, None).is_ok() {
        return Err(format!("Table {} already exists in database {}", config.table, config.db_file.display()));
    }

    // Create the table.
    let inserted = Dataset::create_from_file(&config.tsv_file, &config.db_file, &config.table).map_err(|x| x.to_string())?;

    // Statistics.
    let dataset = Dataset::open(&config.db_file, &config.table, None).map_err(|x| x.to_string())?;
    let count = dataset.count_reads().map_err(|x| x.to_string())?;
    eprintln!(
        "Inserted {} records; table {} contains {} reads with total copy number {}",
        inserted, config.table, count.reads, count.copies
    );
    let size = utils::file_size(&config.db_file).unwrap_or(String::from("unknown"));
    eprintln!("Final database size: {}", size);

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub tsv_file: PathBuf,
    pub db_file: PathBuf,
    pub table: String,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] reads.tsv[.gz]", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        let table_desc = format!("table name (default: {})", Dataset::DEFAULT_TABLE);
        opts.optopt("t", "table", &table_desc, "NAME");
        opts.optopt("o", "output", "output file name (default: <input>.db)", "FILE");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }
        let table = matches.opt_str("t").unwrap_or(String::from(Dataset::DEFAULT_TABLE));

        let tsv_file = if let Some(s) = matches.free.first() {
            PathBuf::from(s)
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };
        let db_file = if let Some(s) = matches.opt_str("o") {
            PathBuf::from(s)
        } else {
            let mut name = tsv_file.clone().into_os_string();
            name.push(".db");
            PathBuf::from(name)
        };

        Config { tsv_file, db_file, table }
    }
}

//-----------------------------------------------------------------------------
