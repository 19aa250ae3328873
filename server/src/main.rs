use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use shared::config::load_config;
use shared::types::{NewAccount, Role};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gateway::AppState;
use gateway::database::{self, accounts};
use gateway::server::{serve, spawn_sweepers};

#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "Admin authentication gateway")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Provision a principal, e.g. the first superadmin
    CreateUser {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        /// superadmin, editor or analyst
        #[arg(long, value_parser = parse_role)]
        role: Role,

        #[arg(long, env = "GATEWAY_NEW_PASSWORD")]
        password: String,
    },
}

fn parse_role(s: &str) -> std::result::Result<Role, String> {
    s.parse::<Role>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // A missing or weak signing secret fails here, before anything listens.
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;
    let Some(secret) = config.auth.resolved_jwt_secret() else {
        bail!("No signing secret configured");
    };

    let pool_size = (config.server.max_connections as u32).clamp(1, 16);
    let db = database::connect(&config.database.url, pool_size)
        .await
        .context("Failed to open database")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(db, config, &secret).await,
        Command::CreateUser {
            email,
            username,
            role,
            password,
        } => {
            let account = NewAccount {
                email,
                username,
                password,
                role,
            };
            let principal =
                accounts::provision_account(&db, account, config.auth.min_password_length)
                    .await
                    .context("Failed to create user")?;
            info!(
                "Created {} <{}> as {} (id {})",
                principal.username, principal.email, principal.role, principal.id
            );
            Ok(())
        }
    }
}

async fn run_server(
    db: sqlx::SqlitePool,
    config: shared::types::server_config::AppConfig,
    secret: &str,
) -> Result<()> {
    let addr = config.server.addr();
    let revocation_every = Duration::from_secs(config.auth.revocation_sweep_secs);
    let limiter_every = Duration::from_secs(config.auth.login_rate_limit_sweep_secs);

    let state = AppState::new(db, config, secret).context("Failed to initialise auth state")?;
    let sweepers = spawn_sweepers(&state, revocation_every, limiter_every);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let result = serve(listener, state, shutdown_signal()).await;

    for task in sweepers {
        task.abort();
    }
    info!("gateway shutdown complete");
    result
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, initiating graceful shutdown");
}
