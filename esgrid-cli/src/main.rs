use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use esgrid::backend::{Dataset, ElasticsearchBackend};
use esgrid::{Config, ResponseFormat};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::QueryArgs;

#[derive(Parser, Debug)]
#[command(name = "esgrid")]
#[command(about = "esgrid - grid-style access to an Elasticsearch type/table")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true, default_value = "esgrid.toml")]
    config: PathBuf,

    /// Type/table URL, e.g. http://localhost:9200/twitter/tweet (overrides config)
    #[arg(long, global = true, env = "ESGRID_URL")]
    url: Option<String>,

    /// Extra request header as 'Name: value' (repeatable)
    #[arg(long = "header", short = 'H', global = true)]
    headers: Vec<String>,

    /// Response handling: json or text (overrides config)
    #[arg(long, global = true)]
    format: Option<ResponseFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the grid fields derived from the mapping
    Schema,

    /// Fetch one record by id
    Get {
        id: String,
    },

    /// Run a grid query
    Query(QueryArgs),

    /// Create a record from a JSON object
    Create {
        /// Record as JSON; an `id` key makes it a PUT by id
        record: String,
    },

    /// Save a change set (at most one change)
    Save {
        /// Record to create, as JSON (repeatable)
        #[arg(long = "create")]
        creates: Vec<String>,

        /// Record to update, as JSON (repeatable)
        #[arg(long = "update")]
        updates: Vec<String>,

        /// Record to delete, as JSON (repeatable)
        #[arg(long = "delete")]
        deletes: Vec<String>,
    },

    /// Partially update one record
    Update {
        id: String,

        /// Fields to change, as a JSON object
        patch: String,
    },

    /// Delete one record by id
    Delete {
        id: String,
    },
}

fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // Results go to stdout, logs stay on stderr
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    commands::apply_overrides(&mut config, cli.url, &cli.headers, cli.format)?;

    init_logging(&config);

    let url = config
        .endpoint
        .url
        .clone()
        .context("No endpoint URL; pass --url or set endpoint.url in the config file")?;
    let dataset = Dataset::new(url);
    let backend = ElasticsearchBackend::new(config.endpoint.options.clone())
        .context("Failed to build HTTP client")?;

    tracing::debug!("Using endpoint {}", dataset.url);

    match cli.command {
        Commands::Schema => commands::run_schema(&backend, &dataset).await,
        Commands::Get { id } => commands::run_get(&backend, &dataset, &id).await,
        Commands::Query(args) => commands::run_query(&backend, &dataset, &args).await,
        Commands::Create { record } => commands::run_create(&backend, &dataset, &record).await,
        Commands::Save {
            creates,
            updates,
            deletes,
        } => commands::run_save(&backend, &dataset, &creates, &updates, &deletes).await,
        Commands::Update { id, patch } => {
            commands::run_update(&backend, &dataset, &id, &patch).await
        }
        Commands::Delete { id } => commands::run_delete(&backend, &dataset, &id).await,
    }
}
