//! # Reddit Live Smoke Test
//!
//! Exercises `lib_common`'s Reddit source against the real API. Needs
//! `REDDIT_CLIENT_ID` and `REDDIT_CLIENT_SECRET` in the environment or a
//! `.env` file.
//!
//! 1. Credential exchange and one top-listing fetch, printing the ranking.
//! 2. A polling session printing every payload to stdout for a few periods.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;

use lib_common::ingestors::{ConnectionSession, PayloadSink, PushError};
use lib_common::sources::reddit::{RedditClient, RedditConfig, rank_contributors};

#[derive(Parser, Debug)]
#[clap(about = "Live checks against the Reddit API")]
struct Args {
    #[clap(long, env = "REDDIT_CLIENT_ID")]
    client_id: String,

    #[clap(long, env = "REDDIT_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Seconds between session pushes.
    #[clap(long, default_value_t = 5)]
    period_secs: u64,

    /// How long to keep the session running.
    #[clap(long, default_value_t = 12)]
    run_secs: u64,
}

/// Prints pushed payloads instead of sending them anywhere.
struct StdoutSink {
    started: Instant,
}

#[async_trait]
impl PayloadSink for StdoutSink {
    async fn push(&mut self, message: String) -> Result<(), PushError> {
        let payload: serde_json::Value =
            serde_json::from_str(&message).map_err(|e| PushError::Send(e.to_string()))?;
        println!(
            "  [{:>5.1}s] {} items, top contributor: {}",
            self.started.elapsed().as_secs_f32(),
            payload["topItems"].as_array().map_or(0, Vec::len),
            payload["topContributors"][0]
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let client = Arc::new(
        RedditClient::new(RedditConfig::new(args.client_id, args.client_secret))
            .context("failed to build Reddit client")?,
    );

    println!("--- Starting Reddit Live Tests ---");

    // --- TEST 1: one authenticated fetch ---
    println!("\n[Test 1] Authenticate and fetch r/science top of the day...");
    let credential = client.authenticate().await?;
    let top = client.fetch_top_items(&credential).await?;
    println!("✅ {} items, rate limit: {:?}", top.items.len(), top.rate_limit);
    for entry in rank_contributors(&top.items) {
        println!("  {:<24} {}", entry.user, entry.count);
    }

    // --- TEST 2: a polling session ---
    println!("\n[Test 2] Polling session every {}s for {}s...", args.period_secs, args.run_secs);
    let sink = StdoutSink { started: Instant::now() };
    let handle = ConnectionSession::new(1, client.clone(), sink)
        .with_period(Duration::from_secs(args.period_secs))
        .activate();

    tokio::time::sleep(Duration::from_secs(args.run_secs)).await;
    handle.disconnect();
    handle.join().await?;
    println!("✅ Session closed cleanly");

    println!("\n--- All Reddit Live Tests Passed ---");
    Ok(())
}
