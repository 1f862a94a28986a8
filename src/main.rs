use std::{path::PathBuf, process, time::Duration};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use itertools::Itertools;
use store_finder::{
    geocode::NOMINATIM_URL, search, Dataset, DistanceModel, Error, Nominatim, SearchRequest,
    StoreFinder, Units, ValidationError, DEFAULT_WORKERS,
};
use tracing_subscriber::EnvFilter;

/// Locates the nearest stores to an address or zip code.
///
/// Prints each matching store's address along with its distance.
#[derive(Debug, Parser)]
#[command(name = "store-finder", version)]
struct Cli {
    /// Find the nearest store to this zip code
    #[arg(long = "zip", value_name = "ZIP")]
    zipcode: Option<String>,

    /// Find the nearest store to this address
    #[arg(long)]
    address: Option<String>,

    /// Display distances in miles or kilometers
    #[arg(long, value_enum, default_value_t = Units::Miles)]
    units: Units,

    /// Human-readable text, or one JSON object per line
    #[arg(long, value_enum, default_value_t = Output::Text)]
    output: Output,

    /// Number of closest stores to display
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    results: i64,

    /// Threads used to calculate distances
    #[arg(long, env = "STORE_FINDER_WORKERS", default_value_t = DEFAULT_WORKERS)]
    max_workers: usize,

    /// Use geodesic distances instead of the haversine approximation
    #[arg(long)]
    actual: bool,

    /// Store catalog CSV [default: bundled catalog]
    #[arg(long, env = "STORE_FINDER_DATASET")]
    dataset: Option<PathBuf>,

    /// Nominatim-compatible geocoding endpoint
    #[arg(long, env = "STORE_FINDER_GEOCODER_URL", default_value = NOMINATIM_URL)]
    geocoder_url: String,

    /// Contact email sent to the geocoder
    #[arg(long, env = "STORE_FINDER_EMAIL")]
    email: Option<String>,

    /// Geocoding request timeout in seconds
    #[arg(long, env = "STORE_FINDER_TIMEOUT", default_value_t = 10)]
    timeout: u64,

    /// Give up waiting on distance calculations after this many milliseconds
    #[arg(long, env = "STORE_FINDER_DEADLINE_MS")]
    deadline_ms: Option<u64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    Text,
    Json,
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        if matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Validation(ValidationError::MissingQuery))
        ) {
            eprintln!();
            Cli::command().print_help().ok();
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let request = SearchRequest {
        address: cli.address,
        zipcode: cli.zipcode,
        results: cli.results,
        units: cli.units,
        model: DistanceModel::from_accurate(cli.actual),
    };
    // fail fast before touching the dataset or the network
    request.validate().map_err(Error::from)?;

    let dataset = match &cli.dataset {
        Some(path) => Dataset::load(path)
            .with_context(|| format!("failed to load stores from {}", path.display()))?,
        None => Dataset::bundled().context("bundled store catalog is broken")?,
    };

    let mut finder = StoreFinder::new(cli.max_workers)?;
    if let Some(ms) = cli.deadline_ms {
        finder = finder.with_deadline(Duration::from_millis(ms));
    }

    let mut geocoder = Nominatim::new(cli.geocoder_url, Duration::from_secs(cli.timeout));
    if let Some(email) = cli.email {
        geocoder = geocoder.with_email(email);
    }

    let results = search(&request, &geocoder, &finder, &dataset)?;
    let rendered = match cli.output {
        Output::Text => results.iter().map(|x| x.to_text()).join("\n\n"),
        Output::Json => results.iter().map(|x| x.to_json()).join("\n"),
    };
    println!("{rendered}");

    Ok(())
}
