use crate::{
    adapters::{csv, json},
    config::Config,
    gateways::geocoding_gateway,
};
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use marketmap_core::{
    entities::Dataset,
    usecases::{enrich_dataset, CoordinateResolver},
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: marketmap.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add coordinates and a location label to every record.
    Enrich(EnrichArgs),

    /// Convert an enriched dataset between CSV and JSON.
    Convert {
        /// Source file (.csv or .json)
        from: PathBuf,

        /// Target file (.csv or .json)
        to: PathBuf,
    },
}

#[derive(Args, Default)]
pub struct EnrichArgs {
    /// Source CSV file
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Enriched CSV file
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Enriched JSON file
    #[arg(long)]
    pub output_json: Option<PathBuf>,

    /// Report of the records that got the placeholder
    #[arg(long)]
    pub failures: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => bail!("Unsupported file format: {}", path.display()),
        }
    }
}

pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let Cli { config, command } = Cli::parse();
    let cfg = Config::try_load_from_file_or_default(config)?;
    match command.unwrap_or_else(|| Command::Enrich(EnrichArgs::default())) {
        Command::Enrich(args) => enrich(&cfg, args),
        Command::Convert { from, to } => convert(&from, &to),
    }
}

fn enrich(cfg: &Config, args: EnrichArgs) -> Result<()> {
    let EnrichArgs {
        input,
        output_csv,
        output_json,
        failures,
    } = args;
    let input = input.unwrap_or_else(|| cfg.files.input.clone());
    let output_csv = output_csv.unwrap_or_else(|| cfg.files.output_csv.clone());
    let output_json = output_json.unwrap_or_else(|| cfg.files.output_json.clone());
    let failures = failures.unwrap_or_else(|| cfg.files.failures.clone());

    let primary = geocoding_gateway(&cfg.geocoding.primary)?;
    let secondary = geocoding_gateway(&cfg.geocoding.secondary)?;
    let resolver = CoordinateResolver::new(primary, secondary, cfg.geocoding.placeholder);

    log::info!("Read records from {}", input.display());
    let mut dataset = csv::read_dataset_from_file(&input)?;
    let report = enrich_dataset(&mut dataset, &cfg.columns, &resolver);
    log::info!(
        "Resolved {} addresses: {} by {}, {} by {}, {} with placeholder",
        report.unique_addresses,
        report.primary,
        cfg.geocoding.primary.name(),
        report.secondary,
        cfg.geocoding.secondary.name(),
        report.placeholder,
    );

    csv::write_dataset_to_file(&output_csv, &dataset)?;
    log::info!("Wrote {}", output_csv.display());
    json::write_dataset_to_file(&output_json, &dataset)?;
    log::info!("Wrote {}", output_json.display());
    if report.failures.is_empty() {
        log::info!("All addresses resolved");
    } else {
        json::write_failures_to_file(&failures, &cfg.columns, &report.failures)?;
        log::warn!(
            "{} records got the placeholder, see {}",
            report.failures.len(),
            failures.display()
        );
    }
    log::info!(
        "Processed {} rows; failures: {}",
        report.records,
        report.failures.len()
    );
    Ok(())
}

fn read_dataset(path: &Path) -> Result<Dataset> {
    match Format::from_path(path)? {
        Format::Csv => csv::read_dataset_from_file(path),
        Format::Json => json::read_dataset_from_file(path),
    }
}

fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    match Format::from_path(path)? {
        Format::Csv => csv::write_dataset_to_file(path, dataset),
        Format::Json => json::write_dataset_to_file(path, dataset),
    }
}

fn convert(from: &Path, to: &Path) -> Result<()> {
    let dataset = read_dataset(from)?;
    if !dataset.is_enriched() {
        log::warn!("Not all records of {} have coordinates", from.display());
    }
    write_dataset(to, &dataset)?;
    log::info!(
        "Converted {} records from {} to {}",
        dataset.len(),
        from.display(),
        to.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_enrich_without_subcommand() {
        let cli = Cli::try_parse_from(["marketmap"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_enrich_args() {
        let cli = Cli::try_parse_from([
            "marketmap",
            "--config",
            "custom.toml",
            "enrich",
            "--input",
            "in.csv",
            "--output-json",
            "out.json",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("custom.toml")));
        let Some(Command::Enrich(args)) = cli.command else {
            panic!("Unexpected command");
        };
        assert_eq!(args.input.as_deref(), Some(Path::new("in.csv")));
        assert_eq!(args.output_json.as_deref(), Some(Path::new("out.json")));
        assert!(args.output_csv.is_none());
    }

    #[test]
    fn detect_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.csv")).unwrap(), Format::Csv);
        assert_eq!(Format::from_path(Path::new("a.JSON")).unwrap(), Format::Json);
        assert!(Format::from_path(Path::new("a.txt")).is_err());
        assert!(Format::from_path(Path::new("a")).is_err());
    }

    #[test]
    fn convert_csv_to_json_and_back() {
        let enriched = "Location Code,City,State,Latitude,Longitude,Location\n\
                        A1,Springfield,IL,39.801055,-89.643604,\"Springfield, IL\"\n";
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.csv");
        let json = dir.path().join("data.json");
        let target = dir.path().join("target.csv");
        fs::write(&source, enriched).unwrap();

        convert(&source, &json).unwrap();
        convert(&json, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), enriched);
    }
}
