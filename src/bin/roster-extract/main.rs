//! Roster table extraction CLI
//!
//! Reads a photographed or scanned roster sheet and writes the extracted
//! table as CSV and as a JSON record list.
//!
//! # Usage
//!
//! ```bash
//! roster-extract roster.jpg --out timetable.csv --json timetable.json --lang ces --debug debug/
//! ```

mod cli;
mod output;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "roster-extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract a shift roster table from an image", long_about = None)]
pub struct Args {
    /// Roster image (PNG or JPEG)
    pub image: PathBuf,

    /// CSV output file
    #[arg(long, default_value = "timetable.csv")]
    pub out: PathBuf,

    /// JSON output file (array of row objects)
    #[arg(long, default_value = "timetable.json")]
    pub json: PathBuf,

    /// Recognition language, e.g. 'ces' or 'ces+eng' [default: eng]
    #[arg(long, env = "ROSTER_LANG")]
    pub lang: Option<String>,

    /// Directory for intermediate debug images
    #[arg(long)]
    pub debug: Option<PathBuf>,

    /// JSON pipeline configuration; command-line flags override it
    #[arg(long, env = "ROSTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Index of the day-number header row [default: 0]
    #[arg(long = "header-row")]
    pub header_row: Option<usize>,

    /// Index of the name column [default: 0]
    #[arg(long = "name-col")]
    pub name_col: Option<usize>,

    /// Path to the tesseract executable
    #[arg(long, default_value = "tesseract", env = "TESSERACT_CMD")]
    pub tesseract: PathBuf,
}

fn main() {
    roster_ocr::utils::init_tracing();

    let args = Args::parse();
    if let Err(err) = cli::run(&args) {
        eprintln!("Error: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}
