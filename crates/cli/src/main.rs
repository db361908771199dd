//! `workflowd` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`: start the API server (optionally with an inline worker).
//! - `worker`: start a queue worker.
//! - `migrate`: run pending database migrations.
//! - `validate`: validate a workflow JSON file.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::{AppState, ServerConfig};
use engine::validate::{check_task_types, validate_new_workflow};
use engine::{Dispatcher, MemoryStore, NewWorkflow, PgStore, WorkflowExecutor, WorkflowStore};
use executors::ExecutorRegistry;
use queue::{JobQueue, JobSource, MemoryQueue, PgQueue, Worker, WorkerConfig};

#[derive(Parser)]
#[command(name = "workflowd", about = "Workflow automation service", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct DatabaseArgs {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    max_connections: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        /// Overrides `HOST`/`PORT`.
        #[arg(long)]
        bind: Option<String>,
        /// Keep everything in process memory; implies `--inline-worker`.
        #[arg(long)]
        in_memory: bool,
        /// Also consume background jobs in this process.
        #[arg(long)]
        inline_worker: bool,
        #[arg(long, env = "WORKER_POLL_INTERVAL_MS", default_value_t = 1000)]
        poll_interval_ms: u64,
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
        #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
        max_connections: u32,
    },
    /// Start a background worker that processes queued jobs.
    Worker {
        #[arg(long, env = "WORKER_POLL_INTERVAL_MS", default_value_t = 1000)]
        poll_interval_ms: u64,
        #[command(flatten)]
        database: DatabaseArgs,
    },
    /// Run pending database migrations.
    Migrate {
        #[command(flatten)]
        database: DatabaseArgs,
    },
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the workflow JSON file.
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    match Cli::parse().command {
        Command::Serve {
            bind,
            in_memory,
            inline_worker,
            poll_interval_ms,
            database_url,
            max_connections,
        } => {
            let database = database_url.map(|database_url| DatabaseArgs {
                database_url,
                max_connections,
            });
            serve(bind, in_memory, inline_worker, poll_interval_ms, database).await
        }
        Command::Worker { poll_interval_ms, database } => {
            let pool = connect(&database).await?;
            let store: Arc<dyn WorkflowStore> = Arc::new(PgStore::new(pool.clone()));
            let executor = Arc::new(WorkflowExecutor::new(store, registry()));
            let worker = Worker::new(
                Arc::new(PgQueue::new(pool)),
                executor,
                WorkerConfig { poll_interval: Duration::from_millis(poll_interval_ms) },
            );

            let (tx, rx) = watch::channel(false);
            tokio::spawn(async move {
                shutdown_signal().await;
                let _ = tx.send(true);
            });
            worker.run(rx).await;
            Ok(())
        }
        Command::Migrate { database } => {
            let pool = connect(&database).await?;
            db::pool::run_migrations(&pool).await.context("migration failed")?;
            info!("Migrations applied successfully");
            Ok(())
        }
        Command::Validate { path } => validate(&path),
    }
}

/// `RUST_LOG`, falling back to `LOG_LEVEL`, then `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| std::env::var("LOG_LEVEL").ok().and_then(|level| EnvFilter::try_new(level).ok()))
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn registry() -> Arc<ExecutorRegistry> {
    Arc::new(ExecutorRegistry::with_builtins())
}

async fn connect(args: &DatabaseArgs) -> anyhow::Result<db::DbPool> {
    let pool = db::pool::create_pool(&args.database_url, args.max_connections)
        .await
        .context("failed to connect to database")?;
    info!("Database connection pool created");
    Ok(pool)
}

async fn serve(
    bind: Option<String>,
    in_memory: bool,
    inline_worker: bool,
    poll_interval_ms: u64,
    database: Option<DatabaseArgs>,
) -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    info!(
        app = %config.app_name,
        environment = %config.environment,
        "Loaded server configuration"
    );

    type Backends = (Arc<dyn WorkflowStore>, Arc<dyn JobQueue>, Arc<dyn JobSource>);
    let (store, job_queue, job_source): Backends = if in_memory {
        info!("Using in-memory store and queue");
        let queue = Arc::new(MemoryQueue::new());
        (Arc::new(MemoryStore::new()), queue.clone(), queue)
    } else {
        let database = database.context("DATABASE_URL must be set (or pass --in-memory)")?;
        let pool = connect(&database).await?;
        let queue = Arc::new(PgQueue::new(pool.clone()));
        (Arc::new(PgStore::new(pool)), queue.clone(), queue)
    };

    let executor = Arc::new(WorkflowExecutor::new(store.clone(), registry()));
    let state = AppState {
        store,
        dispatcher: Dispatcher::new(executor.clone(), job_queue),
        config: Arc::new(config.clone()),
    };

    let (tx, rx) = watch::channel(false);
    let worker_handle = (inline_worker || in_memory).then(|| {
        let worker = Worker::new(
            job_source,
            executor,
            WorkerConfig { poll_interval: Duration::from_millis(poll_interval_ms) },
        );
        tokio::spawn(async move { worker.run(rx).await })
    });

    let addr: SocketAddr = match bind {
        Some(bind) => bind.parse().with_context(|| format!("invalid --bind address {bind}"))?,
        None => config.bind_addr()?,
    };
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    api::serve(listener, state, shutdown_signal()).await?;

    info!("Server stopped accepting connections");
    let _ = tx.send(true);
    if let Some(handle) = worker_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    Ok(())
}

/// Parse and check a workflow file without touching any storage.
fn validate(path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    let workflow: NewWorkflow = serde_json::from_str(&content).context("invalid workflow JSON")?;

    validate_new_workflow(&workflow)?;
    let order = check_task_types(&workflow.tasks, &registry())?;

    println!("Workflow '{}' is valid. Execution order: {order:?}", workflow.name);
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM. A signal handler that cannot be
/// installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn validate_accepts_known_types_and_rejects_unknown() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("workflowd-good-{}.json", std::process::id()));
        let bad = dir.join(format!("workflowd-bad-{}.json", std::process::id()));
        std::fs::write(
            &good,
            r#"{"name": "ok", "tasks": [{"name": "t", "type": "transform"}]}"#,
        )
        .unwrap();
        std::fs::write(&bad, r#"{"name": "ok", "tasks": [{"name": "t", "type": "sms"}]}"#).unwrap();

        assert!(validate(&good).is_ok());
        let err = validate(&bad).unwrap_err();
        assert!(err.to_string().contains("sms"));

        std::fs::remove_file(good).ok();
        std::fs::remove_file(bad).ok();
    }
}
