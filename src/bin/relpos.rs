use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Instant;
use std::{env, process};

use htsdb::{Dataset, PositionEnd, RelPosParams, TableWriter};
use htsdb::{relative_positions, write_report};

use getopts::{Matches, Options};

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();
    let level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Open the datasets.
    let dataset1 = config.first.open()?;
    let dataset2 = config.second.open()?;

    // Compute and report.
    let result = relative_positions(&dataset1, &dataset2, &config.params).map_err(|x| x.to_string())?;
    let mut writer = TableWriter::new(BufWriter::new(io::stdout().lock()));
    write_report(&result, &mut writer).map_err(|x| x.to_string())?;

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    if config.verbose {
        eprintln!("Used {:.3} seconds", seconds);
    }

    Ok(())
}

//-----------------------------------------------------------------------------

struct DatasetConfig {
    pub db_file: PathBuf,
    pub table: String,
    pub filter: Option<String>,
}

impl DatasetConfig {
    fn new(matches: &Matches, suffix: &str, opts: &Options, header: &str) -> DatasetConfig {
        let db_file = if let Some(s) = matches.opt_str(&format!("db{}", suffix)) {
            PathBuf::from(s)
        } else {
            eprintln!("Option --db{} is required", suffix);
            eprint!("{}", opts.usage(header));
            process::exit(1);
        };
        let table = matches.opt_str(&format!("table{}", suffix)).unwrap_or(String::from(Dataset::DEFAULT_TABLE));
        let filter = matches.opt_str(&format!("where{}", suffix));
        DatasetConfig { db_file, table, filter }
    }

    fn open(&self) -> Result<Dataset, String> {
        Dataset::open(&self.db_file, &self.table, self.filter.as_deref()).map_err(|x| x.to_string())
    }
}

struct Config {
    pub first: DatasetConfig,
    pub second: DatasetConfig,
    pub params: RelPosParams,
    pub verbose: bool,
}

impl Config {
    pub fn new() -> Config {
        let mut params = RelPosParams::default();

        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] --db1 FILE --db2 FILE", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        for suffix in ["1", "2"] {
            opts.optopt("", &format!("db{}", suffix), &format!("SQLite database for dataset {} (required)", suffix), "FILE");
            let table_desc = format!("table for dataset {} (default: {})", suffix, Dataset::DEFAULT_TABLE);
            opts.optopt("", &format!("table{}", suffix), &table_desc, "NAME");
            opts.optopt("", &format!("where{}", suffix), &format!("SQL filter for dataset {}", suffix), "SQL");
            let pos_desc = format!("reference point for dataset {} (default: {})", suffix, PositionEnd::default());
            opts.optopt("", &format!("pos{}", suffix), &pos_desc, "5p|3p");
            opts.optflag("", &format!("collapse{}", suffix), &format!("count each position in dataset {} once", suffix));
        }
        let span_desc = format!("maximum distance between compared reads (default: {})", params.span);
        opts.optopt("", "span", &span_desc, "INT");
        opts.optflag("", "by-ref", "report a separate histogram for each reference");
        opts.optflag("", "anti", "compare reads in opposite orientations");
        let threads_desc = format!("number of worker threads (default: {})", params.concurrency);
        opts.optopt("t", "threads", &threads_desc, "INT");
        opts.optflag("v", "verbose", "print progress information");
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
        let first = DatasetConfig::new(&matches, "1", &opts, &header);
        let second = DatasetConfig::new(&matches, "2", &opts, &header);

        // Parameters.
        params.reference_point1 = parse_position(&matches, "pos1");
        params.reference_point2 = parse_position(&matches, "pos2");
        params.collapse1 = matches.opt_present("collapse1");
        params.collapse2 = matches.opt_present("collapse2");
        if let Some(s) = matches.opt_str("span") {
            match s.parse::<usize>() {
                Ok(span) => params.span = span,
                Err(_) => {
                    eprintln!("Invalid span: {}", s);
                    process::exit(1);
                }
            }
        }
        params.group_by_reference = matches.opt_present("by-ref");
        params.anti_sense = matches.opt_present("anti");
        if let Some(s) = matches.opt_str("t") {
            match s.parse::<usize>() {
                Ok(threads) => params.concurrency = threads,
                Err(_) => {
                    eprintln!("Invalid number of threads: {}", s);
                    process::exit(1);
                }
            }
        }
        if let Err(err) = params.validate() {
            eprintln!("{}", err);
            process::exit(1);
        }

        let verbose = matches.opt_present("v");

        Config { first, second, params, verbose }
    }
}

fn parse_position(matches: &Matches, option: &str) -> PositionEnd {
    match matches.opt_str(option) {
        Some(s) => match s.parse::<PositionEnd>() {
            Ok(end) => end,
            Err(err) => {
                eprintln!("{}", err);
                process::exit(1);
            }
        },
        None => PositionEnd::default(),
    }
}

//-----------------------------------------------------------------------------
