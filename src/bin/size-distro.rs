use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::{env, process};

use htsdb::Dataset;

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    // Parse arguments.
    let config = Config::new();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let dataset = Dataset::open(&config.db_file, &config.table, config.filter.as_deref()).map_err(|x| x.to_string())?;
    let sizes = dataset.size_distribution().map_err(|x| x.to_string())?;
    log::info!("Found {} read lengths in {}", sizes.len(), dataset.filename().display());

    let mut output = BufWriter::new(io::stdout().lock());
    htsdb::write_size_distribution(&sizes, &config.label, config.header, &mut output).map_err(|x| x.to_string())?;

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub db_file: PathBuf,
    pub table: String,
    pub filter: Option<String>,
    pub label: String,
    pub header: bool,
}

impl Config {
    const DEFAULT_LABEL: &'static str = "all";

    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] --db FILE", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("", "db", "SQLite database file (required)", "FILE");
        let table_desc = format!("table with aligned reads (default: {})", Dataset::DEFAULT_TABLE);
        opts.optopt("", "table", &table_desc, "NAME");
        opts.optopt("", "where", "SQL filter injected in the WHERE clause", "SQL");
        let label_desc = format!("value for the category column (default: {})", Self::DEFAULT_LABEL);
        opts.optopt("", "as", &label_desc, "NAME");
        opts.optflag("", "header", "write a header line");
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
        let db_file = if let Some(s) = matches.opt_str("db") {
            PathBuf::from(s)
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };
        let table = matches.opt_str("table").unwrap_or(String::from(Dataset::DEFAULT_TABLE));
        let filter = matches.opt_str("where");
        let label = matches.opt_str("as").unwrap_or(String::from(Self::DEFAULT_LABEL));

        Config {
            db_file, table, filter, label,
            header: matches.opt_present("header"),
        }
    }
}

//-----------------------------------------------------------------------------
