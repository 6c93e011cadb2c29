//! job-registry: inspect and maintain the ingestion job registry.
//!
//! Reads `.env` and the `INGESTJOB_PROFILE`-scoped settings for defaults;
//! every command operates on the registry directory directly.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ingestjob_core::{Config, FeatureSetRef, JobRecord, JobStatus, RunnerKind, SourceRef, StoreRef};
use ingestjob_registry::JobStore;

// ── CLI ─────────────────────────────────────────────────────────────

/// Ingestion job registry: list, inspect and update tracked jobs.
#[derive(Parser, Debug)]
#[command(name = "job-registry", version, about)]
struct Cli {
    /// Registry directory (defaults to the profile's REGISTRY_DATA_DIR).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tracked jobs.
    List {
        /// Only jobs in this status (e.g. RUNNING).
        #[arg(long)]
        status: Option<JobStatus>,
    },
    /// Register a new pending job.
    Create {
        #[arg(long)]
        source: String,
        #[arg(long)]
        sink: String,
        /// Stored feature set as `project/name`; repeatable.
        #[arg(long = "feature-set")]
        feature_sets: Vec<FeatureSetRef>,
        /// Runner name (defaults to DEFAULT_RUNNER).
        #[arg(long)]
        runner: Option<RunnerKind>,
        /// Job id (generated when omitted).
        #[arg(long)]
        id: Option<String>,
    },
    /// Print a job's wire snapshot as JSON.
    Show { id: String },
    /// Write a job's wire snapshot under the registry's snapshots dir.
    Export { id: String },
    /// Record a status reported by the runner.
    SetStatus { id: String, status: JobStatus },
    /// Record the runner's own id for a job.
    SetExternalId { id: String, external_id: String },
    /// Delete a job and its feature set associations.
    Delete { id: String },
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    ingestjob_core::config::load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let data_dir = cli.data_dir.unwrap_or_else(|| config.registry.data_dir.clone());
    let store = JobStore::new(&data_dir)
        .with_context(|| format!("opening registry at {}", data_dir.display()))?
        .with_pretty(config.registry.pretty_snapshots);

    match cli.command {
        Command::List { status } => {
            let jobs = match status {
                Some(status) => store.list_jobs_by_status(status)?,
                None => store.list_jobs()?,
            };
            for job in &jobs {
                println!(
                    "{}\t{}\t{}\t{} -> {}\t{} feature sets",
                    job.id(),
                    job.status(),
                    job.runner(),
                    job.source(),
                    job.sink_name(),
                    job.feature_set_count()
                );
            }
            info!("Listed {} jobs", jobs.len());
        }
        Command::Create {
            source,
            sink,
            feature_sets,
            runner,
            id,
        } => {
            let source = SourceRef::new(source);
            let sink = StoreRef::new(sink);
            if let Some(active) = store.find_active_job(&source, &sink)? {
                warn!(
                    "Source/sink pair already has active job '{}' ({})",
                    active.id(),
                    active.status()
                );
            }
            let id = id.unwrap_or_else(|| JobRecord::generate_id(&source, &sink));
            let runner = runner.unwrap_or(config.jobs.default_runner);
            let mut job = JobRecord::new(id, runner, source, sink)?;
            for key in feature_sets {
                let fs = store
                    .load_feature_set(&key)?
                    .with_context(|| format!("feature set {key} is not registered"))?;
                job.associate(&fs);
            }
            store.save_job(&job)?;
            println!("{}", job.id());
        }
        Command::Show { id } => {
            let snapshot = store
                .snapshot_job(&id)
                .with_context(|| format!("building snapshot of job {id}"))?;
            let json = if config.registry.pretty_snapshots {
                serde_json::to_string_pretty(&snapshot)?
            } else {
                serde_json::to_string(&snapshot)?
            };
            println!("{json}");
        }
        Command::Export { id } => {
            let path = store.export_snapshot(&id)?;
            println!("{}", path.display());
        }
        Command::SetStatus { id, status } => {
            let job = store.update_status(&id, status)?;
            println!("{}\t{}", job.id(), job.status());
        }
        Command::SetExternalId { id, external_id } => {
            let job = store.set_external_id(&id, &external_id)?;
            println!("{}\t{}", job.id(), job.external_id());
        }
        Command::Delete { id } => {
            if !store.delete_job(&id)? {
                anyhow::bail!("job not found: {id}");
            }
            println!("deleted {id}");
        }
    }

    Ok(())
}
