//! Portline Kernel
//!
//! Navigation API server and role/menu inspection commands.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use portline_kernel::menu::{FilterPolicy, MenuSource};
use portline_kernel::{AppState, Config, cli, routes};

/// Portline back-office kernel.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// List roles with their priority and grants.
    Roles,
    /// Print the menu a user with the given roles would see.
    Menu {
        /// Role names, e.g. `--role admin --role viewer`.
        #[arg(long = "role")]
        roles: Vec<String>,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        organization: Option<String>,

        /// Menu file to use instead of NAVIGATION_MENU_FILE.
        #[arg(long)]
        menu_file: Option<PathBuf>,

        /// Hoist visible children of hidden items instead of dropping them.
        #[arg(long)]
        no_prune: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    init_tracing();

    // Load configuration from environment
    let config = Config::from_env().context("failed to load configuration")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Roles => {
            cli::cmd_roles();
            Ok(())
        }
        Command::Menu {
            roles,
            department,
            organization,
            menu_file,
            no_prune,
        } => {
            let source = menu_file.map_or_else(|| config.menu_source(), MenuSource::File);
            let policy = FilterPolicy {
                prune_on_parent_failure: config.prune_on_parent_failure && !no_prune,
            };
            cli::cmd_menu(&roles, department, organization, &source, policy)
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting Portline kernel");
    info!(
        port = config.port,
        ttl_secs = config.navigation_cache_ttl.as_secs(),
        prune_on_parent_failure = config.prune_on_parent_failure,
        "Configuration loaded"
    );

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::navigation::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        // stderr keeps `menu` JSON output on stdout clean
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
