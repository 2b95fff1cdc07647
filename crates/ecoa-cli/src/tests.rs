use super::*;

#[test]
fn parses_run_command() {
    let cli = Cli::try_parse_from(["ecoa-cli", "run"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Run));
}

#[test]
fn parses_term_command_without_dry_run() {
    let cli =
        Cli::try_parse_from(["ecoa-cli", "term", "Petrobras"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Term { ref term, dry_run: false } if term == "Petrobras"
    ));
}

#[test]
fn parses_term_command_with_dry_run() {
    let cli = Cli::try_parse_from(["ecoa-cli", "term", "taxa selic", "--dry-run"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Term { ref term, dry_run: true } if term == "taxa selic"
    ));
}

#[test]
fn term_command_requires_a_term() {
    assert!(Cli::try_parse_from(["ecoa-cli", "term"]).is_err());
}

#[test]
fn schedule_interval_is_optional() {
    let cli = Cli::try_parse_from(["ecoa-cli", "schedule"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Schedule {
            interval_minutes: None
        }
    ));

    let cli = Cli::try_parse_from(["ecoa-cli", "schedule", "--interval-minutes", "15"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Schedule {
            interval_minutes: Some(15)
        }
    ));
}

#[test]
fn schedule_rejects_zero_interval() {
    assert!(Cli::try_parse_from(["ecoa-cli", "schedule", "--interval-minutes", "0"]).is_err());
}

#[test]
fn parses_migrate_and_sources_commands() {
    let cli = Cli::try_parse_from(["ecoa-cli", "migrate"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Migrate));

    let cli = Cli::try_parse_from(["ecoa-cli", "sources"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Sources));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["ecoa-cli"]).is_err());
}

#[test]
fn failed_summary_is_an_error() {
    let summary = JobSummary {
        status: JobStatus::Failed,
        ..JobSummary::empty(chrono::Utc::now(), None)
    };
    assert!(report(&summary).is_err());
    assert!(report(&JobSummary::empty(chrono::Utc::now(), None)).is_ok());
}

fn config_without_database() -> AppConfig {
    AppConfig {
        database_url: None,
        log_level: "info".to_owned(),
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 10,
        fetch_timeout_secs: 5,
        fetch_user_agent: "ecoa-test/0.1".to_owned(),
        fetch_accept_language: "pt-BR".to_owned(),
        fetch_max_retries: 0,
        fetch_retry_backoff_base_secs: 0,
        source_max_concurrency: 2,
        enabled_sources: vec!["g1".to_owned(), "cnn".to_owned()],
        scrape_interval_minutes: 60,
        twitter_bearer_token: None,
        threads_access_token: None,
    }
}

#[tokio::test]
async fn dry_run_store_needs_no_database_url() {
    let config = config_without_database();
    assert!(term_store(&config, true).await.is_ok());

    let err = term_store(&config, false).await.err().expect("expected missing url");
    assert!(err.to_string().contains("DATABASE_URL"), "got: {err:#}");
}

#[test]
fn sources_listing_needs_no_database_url() {
    let registry = registry(&config_without_database()).expect("registry should build");
    assert_eq!(registry.ids(), vec!["g1", "cnn"]);
}
