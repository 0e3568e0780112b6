//! lms-audit main entry point
//!
//! This is the command-line interface for the unpublished-course auditor.

use anyhow::Context;
use clap::Parser;
use lms_audit::audit::{print_statistics, CourseAuditor};
use lms_audit::client::{effective_read_timeout, HttpFetcher};
use lms_audit::config::{load_config_with_hash, resolve_token, validate, Config};
use lms_audit::report::write_report;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// lms-audit: find unpublished courses before term start
///
/// Lists an LMS account's courses for a term, probes every unpublished one
/// for modules, assignments, front page content and faculty, and writes the
/// findings to a CSV report.
#[derive(Parser, Debug)]
#[command(name = "lms-audit")]
#[command(version)]
#[command(about = "Audit unpublished LMS courses for a term", long_about = None)]
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

    /// Override the term prefix (e.g. "6253-")
    #[arg(long, value_name = "PREFIX")]
    term: Option<String>,

    /// Override the report output path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be audited without contacting the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) => tracing::debug!("No .env file loaded: {}", e),
    }

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(term) = cli.term {
        config.audit.term_prefix = term;
    }
    if let Some(output) = cli.output {
        config.output.report_path = output.display().to_string();
    }
    validate(&config).context("invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_audit(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lms_audit=info,warn"),
            1 => EnvFilter::new("lms_audit=debug,info"),
            2 => EnvFilter::new("lms_audit=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved settings
fn handle_dry_run(config: &Config) {
    println!("=== lms-audit Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    match resolve_token(&config.api) {
        Ok(_) => println!("  Token: configured"),
        Err(e) => println!("  Token: MISSING ({})", e),
    }
    println!("  Max rate limit: {}", config.api.max_rate_limit);
    println!(
        "  Read timeout: {}s",
        effective_read_timeout(config.api.read_timeout, config.api.min_read_timeout).as_secs()
    );
    println!(
        "  Rate headers: {} / {}",
        config.api.remaining_header, config.api.cost_header
    );

    println!("\nAudit:");
    println!("  Account: {}", config.audit.account_id);
    println!("  Term prefix: {}", config.audit.term_prefix);
    println!("  Search term: {}", config.audit.effective_search_term());
    println!("  Target state: {}", config.audit.target_state);
    println!("  Front page view: {}", config.audit.front_page_view);
    println!(
        "  Published assignments only: {}",
        config.audit.published_assignments_only
    );
    println!("  Page size: {}", config.audit.page_size);

    println!("\nOutput:");
    println!("  Report: {}", config.output.report_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main audit operation
async fn handle_audit(config: Config) -> anyhow::Result<()> {
    let token = resolve_token(&config.api)?;
    let fetcher = HttpFetcher::new(&config.api, token).context("failed to build API client")?;

    tracing::info!(
        "Auditing account {} for {} courses in term {}",
        config.audit.account_id,
        config.audit.target_state,
        config.audit.term_prefix
    );

    let auditor = CourseAuditor::new(&fetcher, &config.audit);
    let report = auditor.run().await.context("audit failed")?;

    let report_path = Path::new(&config.output.report_path);
    write_report(&report.rows, report_path)?;
    println!(
        "Written report to {} with {} entries\n",
        report_path.display(),
        report.rows.len()
    );

    print_statistics(&report.stats);

    Ok(())
}
