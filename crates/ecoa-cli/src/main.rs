mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ecoa_core::AppConfig;
use ecoa_pipeline::{ArticleStore, JobStatus, JobSummary, MemoryStore, Orchestrator, PgStore};
use ecoa_sources::SourceRegistry;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ecoa-cli")]
#[command(about = "ECOA news ingestion command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one ingestion job over every active term
    Run,
    /// Run one ingestion job for a single term
    Term {
        term: String,
        /// Keep results in memory instead of writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the full job on a fixed interval until interrupted
    Schedule {
        /// Overrides `ECOA_SCRAPE_INTERVAL_MINUTES`
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_minutes: Option<u64>,
    },
    /// Apply pending database migrations
    Migrate,
    /// List the sources that would be scraped
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ecoa_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run => {
            let orchestrator = Orchestrator::new(connect_store(&config).await?, registry(&config)?);
            report(&orchestrator.run_scraping_job().await)
        }
        Commands::Term { term, dry_run } => {
            let store = term_store(&config, dry_run).await?;
            let orchestrator = Orchestrator::new(store, registry(&config)?);
            report(&orchestrator.run_term_job(&term).await)
        }
        Commands::Schedule { interval_minutes } => {
            let interval = interval_minutes.map_or_else(
                || config.scrape_interval(),
                |minutes| Duration::from_secs(minutes.saturating_mul(60)),
            );
            let orchestrator = Orchestrator::new(connect_store(&config).await?, registry(&config)?);
            run_schedule(orchestrator, interval).await
        }
        Commands::Migrate => {
            let pool = connect_pool(&config).await?;
            ecoa_db::ping(&pool).await.context("database ping failed")?;
            let applied = ecoa_db::run_migrations(&pool)
                .await
                .context("failed to run migrations")?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Commands::Sources => {
            for id in registry(&config)?.ids() {
                println!("{id}");
            }
            Ok(())
        }
    }
}

async fn connect_pool(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let database_url = config.require_database_url()?;
    let pool_config = ecoa_db::PoolConfig::from_app_config(config);
    ecoa_db::connect_pool(database_url, pool_config)
        .await
        .context("failed to connect to database")
}

async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ArticleStore>> {
    let pool = connect_pool(config).await?;
    Ok(Arc::new(PgStore::new(pool)))
}

async fn term_store(config: &AppConfig, dry_run: bool) -> anyhow::Result<Arc<dyn ArticleStore>> {
    if dry_run {
        tracing::info!("dry run: articles are kept in memory");
        return Ok(Arc::new(MemoryStore::new()));
    }
    connect_store(config).await
}

fn registry(config: &AppConfig) -> anyhow::Result<SourceRegistry> {
    SourceRegistry::from_config(config).context("failed to build source adapters")
}

/// Prints the summary as JSON; a failed job becomes a non-zero exit.
fn report(summary: &JobSummary) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    if summary.status == JobStatus::Failed {
        anyhow::bail!("ingestion job failed: the store could not be used");
    }
    Ok(())
}

async fn run_schedule(orchestrator: Orchestrator, interval: Duration) -> anyhow::Result<()> {
    tracing::info!(interval_secs = interval.as_secs(), "starting scheduled ingestion");

    // First run happens now rather than one interval after startup.
    let summary = orchestrator.run_scraping_job().await;
    tracing::info!(
        status = ?summary.status,
        stored = summary.articles_stored,
        "initial ingestion run complete"
    );

    let mut scheduler = scheduler::build_scheduler(orchestrator, interval).await?;
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("received shutdown signal, stopping scheduler");
    scheduler.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests;
