mod query;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "airadar-cli")]
#[command(about = "airadar trend detection command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Run one trend detection cycle and print the result
    ///
    /// Runs outside the server's detection lock. Trends are cleared and
    /// rebuilt, so a run overlapping the server's scheduled job leaves
    /// whichever finishes last. Prefer POST /api/v1/trends/detect while the
    /// server is up.
    Detect {
        /// Print trends as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored trends, highest score first
    Trends {
        /// Print trends as JSON
        #[arg(long)]
        json: bool,
        /// Only show trends scoring at least this much
        #[arg(long)]
        min_score: Option<f64>,
        /// Maximum number of trends to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// List recently collected items
    Items {
        /// Only show items from this source (e.g. hackernews, github)
        #[arg(long)]
        source: Option<airadar_core::SourceType>,
        /// Maximum number of items to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("airadar-cli ready; run with --help to list commands");
        return Ok(());
    };

    let config = airadar_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = airadar_db::PoolConfig::from_app_config(&config);
    let pool = airadar_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Migrate => {
            let applied = airadar_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Detect { json } => {
            airadar_db::run_migrations(&pool).await?;
            query::run_detect(pool, &config, json).await?;
        }
        Commands::Trends {
            json,
            min_score,
            limit,
        } => query::run_trends(&pool, min_score, limit, json).await?,
        Commands::Items { source, limit } => query::run_items(&pool, source, limit).await?,
    }

    Ok(())
}
