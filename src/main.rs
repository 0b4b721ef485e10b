//! ketebul-api server and maintenance commands.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ketebul_api::{
    app, apply_migrations, ensure_database_exists, seed, AppState, ContentStore, PgStore, Settings,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ketebul-api", version, about = "Read-only content API for artists, books and posts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply the schema and serve HTTP (default)
    Serve,
    /// Create the content schema and tables, then exit
    Migrate,
    /// Load a JSON fixture of artists, books, posts and contact messages
    Seed {
        /// Fixture file path
        path: PathBuf,
    },
    /// Print stored contact messages as JSON lines, newest first
    Messages,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("failed to load settings")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ketebul_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let store = connect(&settings).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(store, settings).await,
        Command::Migrate => {
            tracing::info!(schema = %settings.schema, "migrations applied");
            Ok(())
        }
        Command::Seed { path } => {
            let fixture = seed::read_fixture(&path).await?;
            let counts = seed::seed(&store, &fixture)
                .await
                .with_context(|| format!("failed to seed from {}", path.display()))?;
            println!(
                "loaded {} artists, {} books, {} posts, {} contact messages",
                counts.artists, counts.books, counts.posts, counts.contact_messages
            );
            Ok(())
        }
        Command::Messages => {
            for m in store.list_contact_messages().await? {
                println!(
                    "{}",
                    serde_json::json!({
                        "id": m.id,
                        "name": m.name,
                        "email": m.email,
                        "message": m.message,
                        "timestamp": m.timestamp,
                    })
                );
            }
            Ok(())
        }
    }
}

/// Create the database if needed, open the pool and apply the schema.
async fn connect(settings: &Settings) -> anyhow::Result<PgStore> {
    ensure_database_exists(&settings.database_url)
        .await
        .context("failed to ensure database exists")?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await
        .context("failed to connect to database")?;
    apply_migrations(&pool, &settings.schema)
        .await
        .context("failed to apply migrations")?;
    Ok(PgStore::new(pool, settings.schema.clone()))
}

async fn serve(store: PgStore, settings: Settings) -> anyhow::Result<()> {
    let pool = store.pool().clone();
    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    tracing::info!(
        environment = ?settings.environment,
        frontend = %settings.frontend_url,
        "listening on http://{}",
        listener.local_addr()?
    );

    let state = AppState::new(Arc::new(store), settings);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    pool.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
