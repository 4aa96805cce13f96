use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use jobdesk_api::app::{router, AppState};
use jobdesk_api::auth::{generate_jwt, Claims};
use jobdesk_api::config::CONFIG;
use jobdesk_api::database::{DatabaseManager, PgStore};
use jobdesk_api::is_production;

#[derive(Parser)]
#[command(name = "jobdesk-api")]
#[command(about = "Jobcards, invoices and directories for multi-branch companies")]
#[command(version)]
struct Cli {
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0", help = "Address to bind")]
    host: String,

    #[arg(long, env = "PORT", help = "Port to bind, defaults to the configured API port")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Issue a bearer token for a user id")]
    Token {
        #[arg(help = "User id placed in the token subject")]
        user_id: i64,
        #[arg(long, default_value = "user", help = "Access level carried by the token")]
        access: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and SECURITY_JWT_SECRET are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Token { user_id, access }) => {
            println!("{}", generate_jwt(&Claims::new(user_id, access))?);
            Ok(())
        }
        None => serve(&cli.host, cli.port.unwrap_or(CONFIG.api.port)).await,
    }
}

async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting jobdesk-api in {:?} mode", CONFIG.environment);

    if is_production!() && CONFIG.security.jwt_secret.is_empty() {
        bail!("SECURITY_JWT_SECRET must be set in production");
    }

    let pool = DatabaseManager::connect(&CONFIG.database)
        .await
        .context("failed to connect to the database")?;
    let state = AppState::new(Arc::new(PgStore::new(pool)));

    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("jobdesk-api listening on http://{}", bind_addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
