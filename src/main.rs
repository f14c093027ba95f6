//! series-relay - legacy InfluxDB 0.8 to 0.9 write relay
//!
//! Accepts legacy series writes on `POST /db/graphite/series` and
//! forwards translated point batches to a downstream InfluxDB 0.9
//! server.
//!
//! Usage:
//!   series-relay --bind 0.0.0.0:8089 --dest http://localhost:8086 --db graphite

use clap::Parser;
use series_relay::{
    auth::Credentials,
    forward::{InfluxSink, SinkConfig},
    http::{start_server, AppState},
};
use std::{sync::Arc, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "series-relay")]
#[command(about = "Relay translating legacy InfluxDB 0.8 series writes into 0.9 batches", long_about = None)]
struct Args {
    /// Address the relay listens on
    #[arg(short, long, default_value = "0.0.0.0:8089")]
    bind: String,

    /// URL of the downstream InfluxDB 0.9 server
    #[arg(short, long, default_value = "http://localhost:8086")]
    dest: String,

    /// Downstream database to write to
    #[arg(long, default_value = "graphite")]
    db: String,

    /// Username for inbound requests and the downstream write
    #[arg(short, long, default_value = "influx")]
    user: String,

    /// Password for inbound requests and the downstream write
    #[arg(short, long, default_value = "secret")]
    password: String,

    /// Upper bound in seconds on a single downstream write
    #[arg(long, default_value = "10")]
    forward_timeout_secs: u64,

    /// Log at info level
    #[arg(short, long)]
    verbose: bool,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .json()
        .init();

    info!(bind = %args.bind, dest = %args.dest, db = %args.db, "legacy series relay starting");

    // A client construction failure here is fatal; there is nothing to
    // relay to.
    let sink = InfluxSink::new(&SinkConfig {
        url: args.dest.clone(),
        username: args.user.clone(),
        password: args.password.clone(),
        timeout: Duration::from_secs(args.forward_timeout_secs),
    })?;

    let state = Arc::new(AppState {
        credentials: Credentials::new(args.user, args.password),
        database: args.db,
        sink: Arc::new(sink),
    });

    // Set up graceful shutdown
    let shutdown_signal = async {
        tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C signal handler");
        info!("shutdown signal received, stopping relay");
    };

    tokio::select! {
        result = start_server(&args.bind, state) => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = shutdown_signal => {}
    }

    Ok(())
}
