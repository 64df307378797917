mod lookup;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lithocore-cli")]
#[command(about = "Mineral locality lookups against the Mindat API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search geomaterials by name
    Minerals {
        /// Mineral name or fragment, e.g. "Quarz"
        query: String,
    },
    /// List the localities of a geomaterial
    Localities {
        /// Mindat geomaterial id
        mineral_id: i64,
    },
    /// Run a full search session and print the resulting layers
    Search {
        query: String,

        /// Fill only the search-result layer instead of classifying
        #[arg(long)]
        results_only: bool,

        /// Restrict localities to a country (overrides `LITHOCORE_SEARCH_COUNTRY`)
        #[arg(long)]
        country: Option<String>,

        /// Print the session report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load the localities of a geomaterial picked by id
    Select {
        mineral_id: i64,

        /// Display name for the markers
        #[arg(long)]
        name: Option<String>,
    },
    /// Warm-load the configured default minerals and print layer counts
    Warm,
    /// Validate the authored sites file
    Sites {
        /// Path to the sites file (defaults to `LITHOCORE_SITES_PATH`)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = lithocore_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Minerals { query }) => lookup::run_minerals(&config, &query).await,
        Some(Commands::Localities { mineral_id }) => {
            lookup::run_localities(&config, mineral_id).await
        }
        Some(Commands::Search {
            query,
            results_only,
            country,
            json,
        }) => session::run_search(&config, &query, results_only, country, json).await,
        Some(Commands::Select { mineral_id, name }) => {
            session::run_select(&config, mineral_id, name.as_deref()).await
        }
        Some(Commands::Warm) => session::run_warm(&config).await,
        Some(Commands::Sites { path }) => {
            let path = path.unwrap_or_else(|| config.sites_path.clone());
            session::run_sites(&path)
        }
        None => {
            println!("lithocore-cli: no command given, see --help");
            Ok(())
        }
    }
}
