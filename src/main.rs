use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tfharvest::config::Config;
use tfharvest::core::{run_all, GeneratorRun, ServiceContext};
use tfharvest::google::{self, client::GoogleClient, projects, registry};
use tfharvest::manifest::Manifest;
use tracing::Level;

/// Discover live Google Cloud resources and write a normalized manifest
/// for configuration generation.
#[derive(Parser, Debug)]
#[command(name = "tfharvest", version, about, long_about = None)]
struct Args {
    /// Google Cloud project to discover
    #[arg(short, long)]
    project: Option<String>,

    /// Region to discover regional resources in
    #[arg(short, long)]
    region: Option<String>,

    /// Zone for zonal resources (defaults to the region's `-a` zone)
    #[arg(long)]
    zone: Option<String>,

    /// Resource kinds to discover (defaults to all)
    #[arg(short, long, value_delimiter = ',')]
    kinds: Vec<String>,

    /// Where to write the normalized manifest
    #[arg(short, long, default_value = "tfharvest.json")]
    output: PathBuf,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// List accessible projects and exit
    #[arg(long)]
    list_projects: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .expect("Failed to open log file");
            let (non_blocking, guard) = tracing_appender::non_blocking(file);

            tracing_subscriber::fmt()
                .with_max_level(tracing_level)
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(tracing_level)
                .with_writer(std::io::stderr)
                .with_target(true)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_deref());

    let mut config = Config::load();
    let project = args
        .project
        .clone()
        .unwrap_or_else(|| config.effective_project());
    if project.is_empty() {
        anyhow::bail!(
            "No Google Cloud project configured. Set GOOGLE_CLOUD_PROJECT or use --project"
        );
    }
    let region = args.region.clone().unwrap_or_else(|| config.effective_region());
    let zone = args.zone.clone().unwrap_or_else(|| format!("{region}-a"));

    tracing::info!("Using project: {}, region: {}", project, region);

    let client = GoogleClient::new(&project).await?;

    if args.list_projects {
        let projects = projects::list_projects(&client).await?;
        for project in &projects {
            println!("{}\t{}", project.project_id, project.name);
        }
        return Ok(());
    }

    let kinds: Vec<String> = if args.kinds.is_empty() {
        registry::all_kinds().iter().map(|s| s.to_string()).collect()
    } else {
        args.kinds.clone()
    };

    let ctx = ServiceContext::new(google::PROVIDER_NAME)
        .with_arg("project", project.as_str())
        .with_arg("region", region.as_str())
        .with_arg("zone", zone.as_str());

    let mut runs = Vec::with_capacity(kinds.len());
    for kind in &kinds {
        match registry::generator_for(kind, &ctx, &client) {
            Some(generator) => runs.push(GeneratorRun::new(generator)),
            None => anyhow::bail!(
                "Unknown resource kind `{kind}`. Known kinds: {}",
                registry::all_kinds().join(", ")
            ),
        }
    }

    let outcomes = run_all(runs).await;

    let mut discovered = 0usize;
    let mut failed = 0usize;
    let mut contained = 0usize;
    for outcome in &outcomes {
        match &outcome.error {
            Some(err) => {
                failed += 1;
                eprintln!("{}: discovery failed: {err}", outcome.kind);
            }
            None => {
                discovered += outcome.resources.len();
                contained += outcome.diagnostics.len();
                if !outcome.diagnostics.is_empty() {
                    eprintln!(
                        "{}: {} event(s) contained; result is partial",
                        outcome.kind,
                        outcome.diagnostics.len()
                    );
                }
            }
        }
    }

    if !outcomes.is_empty() && failed == outcomes.len() {
        anyhow::bail!("discovery failed for every requested kind");
    }

    let manifest = Manifest::from_outcomes(google::PROVIDER_NAME, &project, &outcomes);
    manifest.write(&args.output)?;

    println!(
        "Wrote {} resource(s) across {} kind(s) to {}",
        discovered,
        outcomes.len() - failed,
        args.output.display()
    );
    if contained > 0 {
        println!("Note: {contained} containment event(s); do not assume the result is complete.");
    }

    config.remember_run(&project, &region, &kinds)?;

    Ok(())
}
