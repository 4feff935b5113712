//! CLI administration tool for linkgate.
//!
//! Talks to the record store directly, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show a stored record
//! cargo run --bin admin -- inspect AbCd1234
//!
//! # Remove a record
//! cargo run --bin admin -- delete AbCd1234
//!
//! # Create a link
//! cargo run --bin admin -- create https://example.com --max-access 10 --max-age 86400
//!
//! # Check store connectivity
//! cargo run --bin admin -- check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `REDIS_URL` (or its components), `STORE_BACKEND`, `STORE_KEY_PREFIX`.

use linkgate::api::dto::create::{CreateForm, CreateRequest};
use linkgate::application::services::LinkService;
use linkgate::config::{self, StoreBackend, mask_connection_string};
use linkgate::domain::clock::{Clock, SystemClock};
use linkgate::domain::entities::UrlRecord;
use linkgate::domain::repositories::RecordStore;
use linkgate::domain::writeback::WritebackQueue;
use linkgate::server::connect_store;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for managing linkgate records.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stored record for a token
    Inspect {
        token: String,
    },

    /// Delete the record for a token
    Delete {
        token: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Create a short link
    Create {
        long_url: String,

        /// Total access cap (-1 for unlimited)
        #[arg(long, allow_hyphen_values = true)]
        max_access: Option<String>,

        /// Hourly access cap (-1 for unlimited)
        #[arg(long, allow_hyphen_values = true)]
        max_per_hour: Option<String>,

        /// Idle lifetime in seconds
        #[arg(long, allow_hyphen_values = true)]
        max_age: Option<String>,
    },

    /// Check store connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if matches!(cli.command, Commands::Check) {
        println!("{}", "Checking store connection...".bright_blue());
        match config.store_backend {
            StoreBackend::Redis => println!("  Redis: {}", mask_connection_string(&config.redis_url).cyan()),
            StoreBackend::Memory => println!("  Backend: {}", "memory".cyan()),
        }
    }

    let store = connect_store(&config, clock.clone()).await?;

    match cli.command {
        Commands::Inspect { token } => inspect(store, &token).await?,
        Commands::Delete { token, yes } => delete(store, &token, yes).await?,
        Commands::Create {
            long_url,
            max_access,
            max_per_hour,
            max_age,
        } => {
            let form = CreateForm {
                long_url: Some(long_url),
                max_access,
                max_per_hour,
                max_age,
            };
            create(store, clock, form).await?
        }
        Commands::Check => check(store).await?,
    }

    Ok(())
}

/// Prints every field of a stored record.
async fn inspect(store: Arc<dyn RecordStore>, token: &str) -> Result<()> {
    let record = store
        .get(token)
        .await
        .map_err(|e| anyhow::anyhow!("Store error: {}", e))?;

    match record {
        Some(record) => print_record(&record),
        None => println!("{}", format!("No record for token '{token}'").yellow()),
    }

    Ok(())
}

fn print_record(record: &UrlRecord) {
    println!("{}", "Record".bright_white().bold());
    println!("  Token:          {}", record.token.bright_yellow().bold());
    println!("  Long URL:       {}", record.long_url.cyan());
    println!(
        "  Accesses:       {} / {}",
        record.current_access_count, record.max_access
    );
    println!(
        "  This hour:      {} / {}",
        record.hourly_access_count, record.max_per_hour
    );
    println!("  Max age:        {}s", record.age_duration.as_secs());
    println!(
        "  Created:        {}",
        record.created_at.format("%Y-%m-%d %H:%M:%S").to_string().bright_black()
    );
    println!(
        "  Last access:    {}",
        record
            .last_accessed_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
    println!(
        "  Window start:   {}",
        record
            .last_hourly_reset_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
}

/// Deletes a record after confirmation (default: No).
async fn delete(store: Arc<dyn RecordStore>, token: &str, skip_confirm: bool) -> Result<()> {
    let record = store
        .get(token)
        .await
        .map_err(|e| anyhow::anyhow!("Store error: {}", e))?;

    let Some(record) = record else {
        println!("{}", format!("No record for token '{token}'").yellow());
        return Ok(());
    };

    print_record(&record);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this record?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let deleted = store
        .delete(token)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete record: {}", e))?;

    if deleted {
        println!("{}", "✓ Record deleted".green().bold());
    } else {
        println!("{}", "Record expired before it could be deleted".yellow());
    }

    Ok(())
}

/// Creates a link through the same validation and service path as `POST /create`.
async fn create(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, form: CreateForm) -> Result<()> {
    let new_link = CreateRequest::try_from(form)
        .and_then(CreateRequest::into_new_link)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    // Creation never enqueues access updates, so no worker is needed.
    let (writeback, _) = WritebackQueue::channel(1);

    let service = LinkService::new(store, clock, writeback);
    let record = service
        .create_link(new_link)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✓ Link created".green().bold());
    println!();
    print_record(&record);

    Ok(())
}

async fn check(store: Arc<dyn RecordStore>) -> Result<()> {
    if store.health_check().await {
        println!("{}", "✓ Store is reachable".green().bold());
        Ok(())
    } else {
        anyhow::bail!("Store health check failed")
    }
}
