use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::clap_app;
use tracing::info;
use tracing_subscriber::EnvFilter;

use devfeed::common::{self, config, SourceClient};
use devfeed::devto::DevToClient;
use devfeed::hashnode::HashnodeClient;
use devfeed::pipeline;

static PROG_NAME: &str = env!("CARGO_PKG_NAME");
static VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

async fn do_fetch(config_path: &Path) -> Result<()> {
    let started_at = Utc::now();
    let config = config::load(config_path)?;
    let client = common::build_client(&config).context("Failed to build HTTP client")?;
    let clients: Vec<Box<dyn SourceClient>> = vec![
        Box::new(DevToClient::new(client.clone())),
        Box::new(HashnodeClient::new(client)),
    ];

    let pb = common::init_progress_bar((config.tags.len() * clients.len()) as u64);
    pipeline::run(
        &config,
        &clients,
        Some(&pb),
        &started_at,
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = clap_app!((PROG_NAME) =>
        (version: VERSION)
        (about: "Collects recent Dev.to and Hashnode posts for a set of tags")
        (@arg CONFIG: -c --config +takes_value "Config file, created with defaults if missing")
        (@arg VERBOSE: -v --verbose "Log progress to stderr")
    ).get_matches();

    init_logging(matches.is_present("VERBOSE"));
    let config_path = matches
        .value_of("CONFIG")
        .unwrap_or(config::DEFAULT_CONFIG_PATH);
    info!(version = VERSION, config = config_path, "Starting {}", PROG_NAME);

    do_fetch(Path::new(config_path)).await
}
