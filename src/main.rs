//! regnotify - send registry event notifications to an HTTP endpoint
//!
//! Builds a batch of events from the command line, delivers it once to the
//! endpoint configured in the environment and prints the endpoint metrics.

use anyhow::{Context, Result};
use clap::Parser;
use regnotify::{Action, Endpoint, EndpointConfig, Event, Sink, Target};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(
    name = "regnotify",
    about = "Deliver registry event notifications to an HTTP endpoint",
    version = "0.1.0"
)]
struct Args {
    /// Registry action: push, pull, delete or mount
    #[arg(long, default_value = "push")]
    action: Action,

    /// Repository name, e.g. library/alpine
    #[arg(long)]
    repository: String,

    /// Target type, e.g. manifest or layer
    #[arg(long, default_value = "manifest")]
    target_type: String,

    #[arg(long)]
    digest: Option<String>,

    #[arg(long)]
    tag: Option<String>,

    /// Target media type
    #[arg(long)]
    media_type: Option<String>,

    /// Number of events in the batch
    #[arg(long, default_value_t = 1)]
    count: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .init();
    }

    let args = Args::parse();
    let config = EndpointConfig::from_env().context("failed to load endpoint configuration")?;

    info!("Endpoint: {} ({})", config.name, config.url);

    let endpoint = Endpoint::new(&config)?;
    let events = build_events(&args);

    let delivery = endpoint.write(&events).await;
    match &delivery {
        Ok(()) => info!("Delivered {} event(s) to {}", events.len(), endpoint.name()),
        Err(e) => error!("Delivery to {} failed: {}", endpoint.name(), e),
    }

    endpoint.close().await?;

    let metrics = endpoint.read_metrics();
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    delivery.with_context(|| format!("failed to notify {}", endpoint.url()))
}

fn build_events(args: &Args) -> Vec<Event> {
    (0..args.count)
        .map(|_| {
            let mut target = Target::new(args.target_type.clone(), args.repository.clone());
            target.digest = args.digest.clone();
            target.tag = args.tag.clone();
            target.media_type = args.media_type.clone();
            Event::new(args.action, target)
        })
        .collect()
}
