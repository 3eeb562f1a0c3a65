//! Index-Courier main entry point
//!
//! Command-line interface for managing the URL work queue and running the
//! submission loop against the Indexing API.

use clap::{Parser, Subcommand};
use index_courier::auth::CredentialSource;
use index_courier::client::IndexingClient;
use index_courier::config::{load_config_with_hash, Config};
use index_courier::driver::IndexingDriver;
use index_courier::stats::{load_statistics, print_statistics, write_detailed};
use index_courier::store::{SqliteStore, SCHEMA_SQL};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Index-Courier: batch URL submission to the Google Indexing API
///
/// Submits every pending URL from a persistent work queue, rotating through
/// a pool of service-account credentials as they get rate-limited, and
/// recording progress so interrupted batches resume where they stopped.
#[derive(Parser, Debug)]
#[command(name = "index-courier")]
#[command(version = "1.0.0")]
#[command(about = "Batch URL submission to the Google Indexing API", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize the work-queue database. Required before the first run.
    /// WARNING: drops any existing queue, including submission progress.
    Init {
        /// Use an external SQL file instead of the built-in schema
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Add URLs for indexing from a file, one URL per line
    AddUrls {
        /// Path to the file with URLs to index
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Submit every pending URL, rotating credentials as needed
    Run,

    /// Show statistics for the current state of the queue
    Stats {
        /// List every queue row instead of aggregate counts
        #[arg(long)]
        detailed: bool,

        /// Output file for the detailed listing (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::debug!("Configuration loaded (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Init { schema } => handle_init(&config, schema.as_deref())?,
        Command::AddUrls { file } => handle_add_urls(&config, &file)?,
        Command::Run => handle_run(&config).await?,
        Command::Stats { detailed, output } => {
            handle_stats(&config, detailed, output.as_deref())?
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("index_courier=info,warn"),
            1 => EnvFilter::new("index_courier=debug,info"),
            2 => EnvFilter::new("index_courier=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `init`: destructive one-time database bootstrap
fn handle_init(config: &Config, schema: Option<&Path>) -> anyhow::Result<()> {
    tracing::warn!("Initializing database; any existing queue will be dropped");
    tracing::debug!("Database file: {}", config.output.database_path);

    let schema_sql = match schema {
        Some(path) => {
            tracing::debug!("Schema file: {}", path.display());
            std::fs::read_to_string(path)?
        }
        None => SCHEMA_SQL.to_string(),
    };

    let mut store = SqliteStore::open(Path::new(&config.output.database_path))?;
    store.init_from_schema(&schema_sql)?;

    tracing::info!("Database initialization finished");
    Ok(())
}

/// Handles `add-urls`: line-oriented bulk ingestion
fn handle_add_urls(config: &Config, file: &Path) -> anyhow::Result<()> {
    use std::io::{BufRead, BufReader};

    tracing::info!("Ingesting urls from: {}", file.display());
    let reader = BufReader::new(std::fs::File::open(file)?);
    let lines = reader.lines().collect::<Result<Vec<String>, _>>()?;

    let mut store = SqliteStore::open(Path::new(&config.output.database_path))?;
    let summary = store.bulk_insert(lines, config.indexing.log_every)?;

    println!(
        "Ingested {} urls: {} added, {} already present",
        summary.total, summary.added, summary.skipped
    );
    Ok(())
}

/// Handles `run`: the submission loop
async fn handle_run(config: &Config) -> anyhow::Result<()> {
    let mut store = SqliteStore::open(Path::new(&config.output.database_path))?;

    let source = CredentialSource::discover(Path::new(&config.indexing.credentials_dir))?;
    let client = IndexingClient::new(&config.indexing, source)?;

    let driver = IndexingDriver::new(&mut store, client, config.indexing.log_every);
    let summary = driver.run().await?;

    println!(
        "Run finished ({:?}): {} urls processed, {} credential rotations",
        summary.outcome, summary.counters.processed, summary.counters.rotations
    );
    Ok(())
}

/// Handles `stats`: queue state reporting
fn handle_stats(
    config: &Config,
    detailed: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let store = SqliteStore::open(Path::new(&config.output.database_path))?;

    if detailed {
        match output {
            Some(path) => {
                let mut file = std::fs::File::create(path)?;
                write_detailed(&store, &mut file)?;
                println!("Detailed statistics written to: {}", path.display());
            }
            None => {
                let mut stdout = std::io::stdout();
                write_detailed(&store, &mut stdout)?;
            }
        }
    } else {
        let stats = load_statistics(&store)?;
        print_statistics(&stats);
    }

    Ok(())
}
