//! CLI administration tool for shortgate.
//!
//! Inspects links and their verification state directly in PostgreSQL,
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show one link
//! cargo run --bin shortgate-admin -- status my-link
//!
//! # Links still waiting for verification for more than 10 minutes
//! cargo run --bin shortgate-admin -- pending --older-than 600
//!
//! # Link and click counts
//! cargo run --bin shortgate-admin -- stats
//!
//! # Check database connection
//! cargo run --bin shortgate-admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `DB_HOST`/`DB_USER`/...): PostgreSQL connection

use shortgate::config::Config;
use shortgate::domain::entities::{QrStatus, Reachability};
use shortgate::domain::repositories::{ClickRepository, LinkRegistry};
use shortgate::infrastructure::persistence::{PgClickRepository, PgLinkRegistry};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for inspecting shortgate.
#[derive(Parser)]
#[command(name = "shortgate-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a link's verification state
    Status {
        /// Short hash
        hash: String,
    },

    /// List links whose verification is still pending
    Pending {
        /// Only links created more than this many seconds ago
        #[arg(long, default_value_t = 0)]
        older_than: u64,

        /// Maximum rows to print
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let database_url = config
        .database_url
        .context("DATABASE_URL must be set; in-memory links are not visible to this tool")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Status { hash } => show_status(&pool, &hash).await?,
        Commands::Pending { older_than, limit } => list_pending(&pool, older_than, limit).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn paint_reachability(state: Reachability) -> ColoredString {
    match state {
        Reachability::Pending => state.as_str().yellow(),
        Reachability::Reachable => state.as_str().green(),
        Reachability::Unreachable => state.as_str().red(),
    }
}

fn paint_qr(state: QrStatus) -> ColoredString {
    match state {
        QrStatus::NotRequested => state.as_str().bright_black(),
        QrStatus::Pending => state.as_str().yellow(),
        QrStatus::Ready => state.as_str().green(),
    }
}

/// Prints one link with its click count.
///
/// Quota usage is process-local to the server and is not shown here; use
/// `GET /api/link/{hash}` for that.
async fn show_status(pool: &PgPool, hash: &str) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let registry = PgLinkRegistry::new(pool.clone());
    let clicks = PgClickRepository::new(pool);

    let link = registry
        .get(hash)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("No link with hash '{hash}'"))?;

    let click_count = clicks
        .count_for(hash)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let limit = if link.is_unlimited() {
        "unlimited".to_string()
    } else {
        format!("{} per window", link.redirect_limit)
    };

    println!("{}", "🔗 Link".bright_blue().bold());
    println!();
    println!("  Hash:         {}", link.hash.cyan());
    println!("  Target:       {}", link.target.bright_white());
    println!(
        "  Created:      {}",
        link.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
    println!("  Reachability: {}", paint_reachability(link.reachability));
    println!("  QR:           {}", paint_qr(link.qr));
    println!("  Limit:        {}", limit);
    println!(
        "  Clicks:       {}",
        click_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Lists links stuck in `pending`, oldest first.
///
/// # Output Format
///
/// ```text
///   Hash           Created              Reachability  QR
///   ───────────────────────────────────────────────────────────
///   Xk2_9aBqLm0z   2026-01-15 10:30     pending       not_requested
/// ```
async fn list_pending(pool: &PgPool, older_than: u64, limit: i64) -> Result<()> {
    println!("{}", "⏳ Pending verification".bright_blue().bold());
    println!();

    let registry = PgLinkRegistry::new(Arc::new(pool.clone()));
    let age = i64::try_from(older_than)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .context("--older-than is out of range")?;
    let cutoff = Utc::now()
        .checked_sub_signed(age)
        .context("--older-than is out of range")?;

    let links = registry
        .list_stale(cutoff, limit.max(1))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  Nothing pending".green());
        println!();
        return Ok(());
    }

    println!(
        "  {:<14} {:<20} {:<13} {:<13}",
        "Hash".bright_white().bold(),
        "Created".bright_white().bold(),
        "Reachability".bright_white().bold(),
        "QR".bright_white().bold()
    );
    println!("  {}", "─".repeat(63).bright_black());

    for link in &links {
        println!(
            "  {:<14} {:<20} {:<13} {}",
            link.hash.cyan(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            paint_reachability(link.reachability),
            paint_qr(link.qr)
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Displays link counts per reachability state and the click total.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT reachability, COUNT(*) FROM short_links GROUP BY reachability ORDER BY reachability",
    )
    .fetch_all(pool)
    .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
        .fetch_one(pool)
        .await?;

    let total: i64 = rows.iter().map(|(_, n)| n).sum();
    println!("  Links:       {}", total.to_string().bright_green().bold());
    for (state, count) in &rows {
        println!("    {:<12} {}", state.bright_black(), count);
    }
    println!(
        "  Clicks:      {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
