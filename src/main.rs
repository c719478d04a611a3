use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{error, info, warn};

use stalewatch::config::host::HostIdentity;
use stalewatch::config::settings::{self, FailurePolicy, SentinelPolicy, Settings};
use stalewatch::core::orchestrator::Orchestrator;
use stalewatch::core::progress::ProgressTracker;
use stalewatch::models::scan_result::ScanResult;
use stalewatch::report::reporter::{ReportOutcome, Reporter};
use stalewatch::report::sink::{HttpSink, MetricSink, StdoutSink};

/// Exit code when any metric submission fails.
const EXIT_REPORT_FAILURE: u8 = 99;

#[derive(Parser, Debug)]
#[command(name = "stalewatch", version, about = "Report stale file counts as metrics")]
struct Cli {
    /// JSON file listing {"Path", "TimeInterval"} records to scan
    #[arg(short = 'r', long, env = "STALEWATCH_REQUESTS")]
    requests: PathBuf,

    /// JSON settings file
    #[arg(short = 'c', long, env = "STALEWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Metrics intake URL
    #[arg(long, env = "STALEWATCH_ENDPOINT")]
    endpoint: Option<String>,

    /// API key sent with each submission
    #[arg(long, env = "STALEWATCH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Metric namespace
    #[arg(long)]
    namespace: Option<String>,

    #[arg(long, env = "STALEWATCH_INSTANCE_ID")]
    instance_id: Option<String>,

    #[arg(long, env = "STALEWATCH_INSTANCE_NAME")]
    instance_name: Option<String>,

    /// Print samples to stdout instead of submitting them
    #[arg(long)]
    dry_run: bool,

    /// Do not report directories whose scan failed
    #[arg(long)]
    skip_failed: bool,

    /// Keep reporting after a submission fails
    #[arg(long)]
    continue_on_error: bool,

    /// Write scan results as JSON to file
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Write scan results as a Markdown table to file
    #[arg(long)]
    export_markdown: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing (logs to stderr)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_REPORT_FAILURE),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ReportOutcome> {
    let settings = build_settings(&cli)?;
    let requests = settings::load_requests(&cli.requests)?;
    let http_sink = match settings.endpoint {
        Some(ref endpoint) if !cli.dry_run => Some(HttpSink::new(
            endpoint.clone(),
            settings.api_key.clone(),
            settings.timeout(),
        )?),
        _ => None,
    };
    let host = HostIdentity::resolve(cli.instance_id.clone(), cli.instance_name.clone());
    info!(
        requests = requests.len(),
        instance_id = %host.instance_id,
        instance_name = %host.instance_name,
        "starting run"
    );

    let now = Utc::now();
    let progress = Arc::new(ProgressTracker::new());
    let orchestrator = Orchestrator::new(Arc::clone(&progress));
    let results = orchestrator.run(&requests, now).await;

    let snapshot = progress.snapshot();
    info!(
        directories = snapshot.requests_processed,
        failed = snapshot.requests_failed,
        files = snapshot.files_seen,
        stale = snapshot.stale_files,
        elapsed_ms = snapshot.elapsed.as_millis() as u64,
        "scan finished"
    );

    let outcome = match http_sink {
        Some(sink) => report(sink, &settings, &results, &host).await,
        None => report(StdoutSink, &settings, &results, &host).await,
    };

    write_exports(
        cli.export_json.as_deref(),
        cli.export_markdown.as_deref(),
        &results,
        now,
    );

    Ok(outcome)
}

/// Writes the optional on-disk reports. Failures are logged and counted but
/// never affect the exit status.
fn write_exports(
    json_path: Option<&Path>,
    markdown_path: Option<&Path>,
    results: &[ScanResult],
    now: DateTime<Utc>,
) -> usize {
    let mut failures = 0;

    if let Some(path) = json_path {
        match stalewatch::export::json::export_json(results, path)
            .with_context(|| format!("failed to write {}", path.display()))
        {
            Ok(()) => info!("Exported to: {}", path.display()),
            Err(e) => {
                warn!("{:#}", e);
                failures += 1;
            }
        }
    }
    if let Some(path) = markdown_path {
        match stalewatch::export::markdown::export_markdown(results, now, path)
            .with_context(|| format!("failed to write {}", path.display()))
        {
            Ok(()) => info!("Exported to: {}", path.display()),
            Err(e) => {
                warn!("{:#}", e);
                failures += 1;
            }
        }
    }

    failures
}

async fn report<S: MetricSink>(
    sink: S,
    settings: &Settings,
    results: &[ScanResult],
    host: &HostIdentity,
) -> ReportOutcome {
    Reporter::new(sink, settings)
        .report_all(results, host, Utc::now())
        .await
}

fn build_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match cli.config {
        Some(ref path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(ref endpoint) = cli.endpoint {
        settings.endpoint = Some(endpoint.clone());
    }
    if let Some(ref api_key) = cli.api_key {
        settings.api_key = Some(api_key.clone());
    }
    if let Some(ref namespace) = cli.namespace {
        settings.namespace = namespace.clone();
    }
    if cli.skip_failed {
        settings.sentinel_policy = SentinelPolicy::Skip;
    }
    if cli.continue_on_error {
        settings.failure_policy = FailurePolicy::Continue;
    }
    if !cli.dry_run && settings.endpoint.is_none() {
        anyhow::bail!("no metrics endpoint configured (use --endpoint or --dry-run)");
    }
    Ok(settings)
}
