//! relaybot - demo chat bot driven from stdin.
//!
//! Every stdin line is treated as a chat message from one user in one
//! channel. `@name` and `#name` tokens naming seeded directory entries are
//! reported as mentions, the way a chat service would.

mod bot;

use relaybot::commands::{CommandService, Configuration};
use relaybot::config::{Config, LogFormat, LoggingConfig};
use relaybot::{http, metrics};
use relaybot_model::{MessageCreated, Reply};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Capacity of the inbound and outbound message queues.
const QUEUE_CAPACITY: usize = 256;

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "relaybot.toml".to_string());

    let config = if Path::new(&config_path).exists() {
        Some(Config::load_validated(&config_path)?)
    } else {
        None
    };
    let using_defaults = config.is_none();
    let config = config.unwrap_or_default();
    init_tracing(&config.logging);
    if using_defaults {
        warn!(path = %config_path, "Config file not found, using defaults");
    }

    info!(
        prefix = %config.commands.prefix,
        members = config.directory.members.len(),
        "Starting relaybot"
    );

    if let Some(port) = config.metrics.port {
        metrics::init();
        let bind = config.metrics.bind;
        tokio::spawn(async move {
            http::run_http_server(bind, port).await;
        });
        info!(port, "Prometheus HTTP server started");
    } else {
        info!("Metrics disabled");
    }

    let directory = Arc::new(bot::seed_directory(&config.directory));
    let service = CommandService::new(
        Configuration::from_config(&config.commands),
        bot::command_tree()?,
        Arc::clone(&directory) as Arc<dyn relaybot::resolver::EntityResolver>,
    )?;

    let mut failures = service.subscribe_failures();
    tokio::spawn(async move {
        while let Some(failure) = failures.recv().await {
            println!("! {}", failure.describe());
        }
    });

    let (out_tx, mut out_rx) = mpsc::channel::<Reply>(QUEUE_CAPACITY);
    tokio::spawn(async move {
        while let Some(reply) = out_rx.recv().await {
            println!("[{}] {}", reply.channel_id, reply.content);
        }
    });

    let (in_tx, in_rx) = mpsc::channel::<MessageCreated>(QUEUE_CAPACITY);
    let serving = tokio::spawn(service.serve(in_rx, out_tx));

    let server = config.directory.server.clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sequence: u64 = 0;
    while let Some(line) = lines.next_line().await? {
        sequence += 1;
        let mut message =
            MessageCreated::new(sequence.to_string(), "console", "console-user", line.as_str())
                .with_mentions(directory.mentions_in(&line));
        if let Some(server) = &server {
            message = message.in_server(server.as_str());
        }
        if in_tx.send(message).await.is_err() {
            error!("Command service stopped");
            break;
        }
    }

    drop(in_tx);
    serving.await?;
    info!("Shutting down");
    Ok(())
}
