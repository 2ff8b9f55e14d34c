//! kairos-csv binary.
//!
//! Converts a KairosDB query-response file to CSV.

use std::path::PathBuf;

use clap::Parser;
use kairos_csv::{CaseAction, ConverterConfig, CsvConverter, TagTransform};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert KairosDB query-response JSON to CSV",
    long_about = None
)]
struct Cli {
    /// Query response JSON file
    input: PathBuf,

    /// Output CSV file. Without it, a new file is created next to the input
    /// and its path is printed.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, env = "KAIROS_CSV_CONFIG")]
    config: Option<PathBuf>,

    /// Leave out the "Metric Name" column
    #[arg(long)]
    no_metric_name: bool,

    /// Change the case of the values of the tags given with --tag-name
    #[arg(long, value_name = "lowercase|uppercase", requires = "tag_names")]
    tag_case: Option<CaseAction>,

    /// Tag whose values --tag-case applies to (repeatable)
    #[arg(long = "tag-name", value_name = "NAME")]
    tag_names: Vec<String>,

    /// Log filter, e.g. "kairos_csv=debug"
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_filter: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder().parse_lossy(&cli.log_filter))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let mut config = match &cli.config {
        Some(path) => ConverterConfig::from_json_file(path)?,
        None => ConverterConfig::default(),
    };
    if cli.no_metric_name {
        config.show_metric_name = false;
    }
    if let Some(action) = cli.tag_case {
        config.tag_transform = Some(TagTransform::new(action, cli.tag_names.iter().cloned()));
    }

    let converter = CsvConverter::with_config(config)?;
    info!(input = %cli.input.display(), "converting query results");

    let outcome = match &cli.output {
        Some(output) => converter
            .convert_file(&cli.input, output)
            .map(|_| output.clone()),
        None => converter.process_query_results(&cli.input),
    };

    match outcome {
        Ok(path) => {
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "conversion failed");
            Err(e.into())
        }
    }
}
