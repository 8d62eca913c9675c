//! Parlor server binary — the main entry point for the Parlor backend.
//!
//! `parlor-server [serve] [config]` starts the axum HTTP server with
//! structured logging and graceful shutdown on SIGTERM/SIGINT.
//! `parlor-server init-db [config]` applies the bundled schema to the
//! configured store and exits.

use parlor_db::{init_schema, DbSettings, RequestContext, SCHEMA};
use parlor_server::config::{self, DEV_SECRET};
use parlor_server::{app, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

enum Command {
    Serve,
    InitDb,
}

fn resolve_command() -> (Command, Option<String>, &'static str) {
    let mut args = std::env::args().skip(1).filter(|a| !a.trim().is_empty());

    let (command, config_arg) = match args.next() {
        Some(arg) if arg == "init-db" => (Command::InitDb, args.next()),
        Some(arg) if arg == "serve" => (Command::Serve, args.next()),
        // Bare path argument: serve with that config.
        Some(arg) => (Command::Serve, Some(arg)),
        None => (Command::Serve, None),
    };

    if let Some(path) = config_arg {
        return (command, Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("PARLOR_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (command, Some(path), "env-var");
        }
    }

    (command, None, "default")
}

/// Creates the parent directory of the database file if it is missing.
///
/// The store itself is created lazily on first open; its directory is not.
fn ensure_storage_dir(db_path: &str) {
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "failed to create storage directory");
            }
        }
    }
}

/// Applies the bundled schema through a fresh request context.
fn run_init_db(settings: &DbSettings) -> Result<(), String> {
    let mut ctx = RequestContext::new();
    let result = match ctx.get_connection(settings) {
        Ok(conn) => init_schema(conn, SCHEMA).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    ctx.close_connection();
    result
}

#[tokio::main]
async fn main() {
    let (command, resolved_config_path, config_source) = resolve_command();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    ensure_storage_dir(&config.database.path);

    let db = DbSettings {
        path: config.database.path.clone(),
        busy_timeout_ms: config.database.busy_timeout_ms,
    };

    if let Command::InitDb = command {
        match run_init_db(&db) {
            Ok(()) => {
                tracing::info!(path = %db.path, "database initialized");
                println!("Initialized the database.");
            }
            Err(e) => {
                eprintln!("error: failed to initialize the database: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if config.auth.secret == DEV_SECRET {
        tracing::warn!(
            "auth.secret is the development default; set PARLOR_SECRET before deploying"
        );
    }

    // Build application
    let state = AppState {
        db,
        secret: config.auth.secret.clone(),
    };
    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting parlor server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address — is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("parlor server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
