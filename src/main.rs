//! `azb` command-line client.
//!
//! Drives the resilient client against a backend: probe and wake it,
//! issue ad-hoc requests, manage the stored session.

use std::path::PathBuf;

use azb_client::config::{self, ClientConfig};
use azb_client::observability::logging;
use azb_client::{ApiClient, ApiError, RequestOptions};
use azb_client::auth::AuthInvalidated;
use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(name = "azb")]
#[command(about = "Resilient client for a cold-starting backend API", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API base URL (e.g. http://localhost:4000/api)
    #[arg(short, long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe backend liveness once
    Health,
    /// Wake a sleeping backend
    Wake {
        #[arg(long)]
        attempts: Option<u32>,
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Send a request through the retry pipeline
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,
        /// Path below the base URL (e.g. /products)
        path: String,
        /// JSON body
        #[arg(long)]
        body: Option<String>,
    },
    /// Store a session token
    Login {
        #[arg(long)]
        token: String,
        /// Opaque user record to store alongside the token
        #[arg(long)]
        user: Option<String>,
    },
    /// Remove the stored session
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config: ClientConfig = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::loader::load_default()?,
    };
    if let Some(url) = cli.base_url {
        config.api.base_url = url;
    }
    config::loader::ensure_session_storage(&mut config, cli.config.as_deref());

    logging::init_logging(&config.observability);

    let client = ApiClient::new(config)?;
    let mut invalidations = client.subscribe_auth_invalid();

    let result = run(&client, cli.command).await;

    // Events raised during the command, reported before exit
    report_invalidations(&mut invalidations);

    result
}

fn report_invalidations(invalidations: &mut broadcast::Receiver<AuthInvalidated>) -> usize {
    let mut seen = 0;
    while let Ok(event) = invalidations.try_recv() {
        tracing::warn!(event = event.name(), "Session invalidated; log in again");
        seen += 1;
    }
    seen
}

async fn run(client: &ApiClient, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Health => {
            let awake = client.health_check().await;
            println!("{}", if awake { "awake" } else { "asleep" });
        }
        Commands::Wake { attempts, delay_ms } => {
            let health = &client.config().health_check;
            let attempts = attempts.unwrap_or(health.wake_attempts);
            let delay_ms = delay_ms.unwrap_or(health.wake_base_delay_ms);
            let awake = client.wake(attempts, delay_ms).await;
            println!("{}", if awake { "awake" } else { "still asleep" });
        }
        Commands::Request { method, path, body } => {
            let method: Method = method.to_uppercase().parse()?;
            let mut options = RequestOptions::new(method);
            if let Some(body) = body {
                options = options.body(body);
            }
            match client.request(&path, options).await {
                Ok(value) => print_value(&value)?,
                Err(e) => return Err(report(e)),
            }
        }
        Commands::Login { token, user } => {
            client.login_with(&token, user.as_deref());
            println!("session stored in {}", session_location(client));
        }
        Commands::Logout => {
            client.logout();
            println!("session cleared from {}", session_location(client));
        }
    }

    Ok(())
}

fn session_location(client: &ApiClient) -> &str {
    client.config().auth.storage_path.as_deref().unwrap_or("memory")
}

fn print_value(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    match value {
        Value::String(text) => println!("{}", text),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

fn report(error: ApiError) -> Box<dyn std::error::Error> {
    if let Some(response) = error.response() {
        eprintln!("Error: status {}", response.status);
        if !response.data.is_null() {
            eprintln!("Response: {}", response.data);
        }
    }
    Box::new(error)
}
