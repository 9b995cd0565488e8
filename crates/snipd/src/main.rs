//! snipd — the snipbin daemon.
//!
//! Single binary that assembles the paste service:
//! - Snippet store (embedded redb database or in-memory map)
//! - Lifecycle engine
//! - Web UI + health endpoint
//!
//! # Usage
//!
//! ```text
//! snipd serve --port 8080 --data-dir /var/lib/snipbin --backend redb
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use snip_engine::LifecycleEngine;
use snip_store::{MemoryStore, RedbStore, SnippetStore};
use snip_web::WebState;

#[derive(Parser)]
#[command(name = "snipd", about = "snipbin paste service daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Storage backend selection.
#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Embedded redb database under --data-dir.
    Redb,
    /// Process-local map; all pastes are lost on restart.
    Memory,
}

#[derive(Subcommand)]
enum Command {
    /// Run the paste service.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Data directory for persistent state.
        #[arg(long, default_value = "/var/lib/snipbin")]
        data_dir: PathBuf,

        /// Storage backend.
        #[arg(long, value_enum, default_value = "redb")]
        backend: Backend,

        /// Absolute base (scheme + host) for generated view URLs.
        /// Defaults to the Host header of each request.
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,snipd=debug,snip_store=debug,snip_engine=debug"
                    .parse()
                    .unwrap()
            }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            data_dir,
            backend,
            base_url,
        } => serve(port, data_dir, backend, base_url).await,
    }
}

async fn serve(
    port: u16,
    data_dir: PathBuf,
    backend: Backend,
    base_url: Option<String>,
) -> anyhow::Result<()> {
    info!("snipd starting");

    // ── Snippet store ──────────────────────────────────────────

    let store: Arc<dyn SnippetStore> = match backend {
        Backend::Redb => {
            std::fs::create_dir_all(&data_dir)?;
            let db_path = data_dir.join("snippets.redb");
            let store = RedbStore::open(&db_path)?;
            info!(path = ?db_path, "snippet store opened");
            Arc::new(store)
        }
        Backend::Memory => {
            info!("using in-memory snippet store");
            Arc::new(MemoryStore::new())
        }
    };

    // ── Lifecycle engine ───────────────────────────────────────

    let engine = Arc::new(LifecycleEngine::new(store));

    // ── Web server ─────────────────────────────────────────────

    let router = snip_web::build_router(WebState { engine, base_url });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "web server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("snipd stopped");
    Ok(())
}
