//! Runs one extraction from parsed command-line arguments.

use crate::Args;
use crate::output;
use roster_ocr::core::{OcrResult, PipelineConfig};
use roster_ocr::pipeline::RosterExtractorBuilder;
use roster_ocr::recognition::TesseractCli;
use std::time::Instant;
use tracing::info;

pub fn run(args: &Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();

    let config = load_config(args)?;
    if config.parallel.install_global_thread_pool()? {
        info!("Using {:?} worker threads", config.parallel.max_threads);
    }

    let mut builder =
        RosterExtractorBuilder::new(TesseractCli::new(&args.tesseract)).config(config);
    if let Some(dir) = &args.debug {
        builder = builder.debug_dir(dir);
    }
    let extractor = builder.build()?;

    info!("Processing {}", args.image.display());
    let extraction = extractor.extract_path(&args.image)?;
    info!(
        "Extracted {} rows x {} columns ({:?}) in {:.2}ms",
        extraction.table.row_count(),
        extraction.table.column_count(),
        extraction.strategy,
        start.elapsed().as_secs_f64() * 1000.0
    );

    output::write_csv_file(&args.out, &extraction.table)?;
    output::write_json_file(&args.json, &extraction.table)?;

    println!("Done");
    println!("Saved to: {} and {}", args.out.display(), args.json.display());
    output::print_preview(&extraction.table);
    Ok(())
}

/// Reads the optional configuration file and applies the flags the user
/// actually passed on top of it.
pub fn load_config(args: &Args) -> OcrResult<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            PipelineConfig::from_json_file(path)?
        }
        None => PipelineConfig::default(),
    };
    if let Some(lang) = &args.lang {
        config.classifier.language = lang.clone();
    }
    if let Some(row) = args.header_row {
        config.classifier.header_row_index = row;
    }
    if let Some(col) = args.name_col {
        config.classifier.name_col_index = col;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn config_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_file_values_survive_without_flags() {
        let file = config_file(
            r#"{"classifier": {"language": "ces", "header_row_index": 1, "name_col_index": 2}}"#,
        );
        let path = file.path().to_str().unwrap();
        let args = Args::try_parse_from(["roster-extract", "roster.png", "--config", path]).unwrap();

        let config = load_config(&args).unwrap();
        assert_eq!(config.classifier.language, "ces");
        assert_eq!(config.classifier.header_row_index, 1);
        assert_eq!(config.classifier.name_col_index, 2);
    }

    #[test]
    fn test_flags_override_config_file() {
        let file = config_file(r#"{"classifier": {"language": "ces", "name_col_index": 2}}"#);
        let path = file.path().to_str().unwrap();
        let args = Args::try_parse_from([
            "roster-extract",
            "roster.png",
            "--config",
            path,
            "--lang",
            "deu",
            "--name-col",
            "0",
        ])
        .unwrap();

        let config = load_config(&args).unwrap();
        assert_eq!(config.classifier.language, "deu");
        assert_eq!(config.classifier.name_col_index, 0);
        assert_eq!(config.classifier.header_row_index, 0);
    }

    #[test]
    fn test_defaults_without_config_or_flags() {
        let args = Args::try_parse_from(["roster-extract", "roster.png"]).unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.classifier.language, "eng");
        assert_eq!(config.classifier.header_row_index, 0);
    }
}
