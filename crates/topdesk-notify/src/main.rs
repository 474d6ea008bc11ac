//! topdesk-notify - create TOPdesk incidents from log stream alerts
//!
//! Offline commands inspect and render a configuration; `send` delivers an
//! alert event read from a JSON file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use topdesk_notify::{
    requested_configuration, AlarmCallback, AlertEvent, IncidentAdapter, IncidentConfig,
    SubmissionOutcome,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "topdesk-notify")]
#[command(about = "Create TOPdesk incidents from log stream alerts")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the configuration form as JSON
    Fields,

    /// Validate a configuration file without contacting TOPdesk
    Validate {
        /// Path to config file
        #[arg(short, long, env = "TOPDESK_NOTIFY_CONFIG")]
        config: PathBuf,
    },

    /// Print a configuration with secrets masked
    Attributes {
        /// Path to config file
        #[arg(short, long, env = "TOPDESK_NOTIFY_CONFIG")]
        config: PathBuf,
    },

    /// Render the description and optional fields for an event
    Render {
        /// Path to config file
        #[arg(short, long, env = "TOPDESK_NOTIFY_CONFIG")]
        config: PathBuf,

        /// Path to alert event file
        #[arg(short, long)]
        event: PathBuf,
    },

    /// Create an incident for an event
    Send {
        /// Path to config file
        #[arg(short, long, env = "TOPDESK_NOTIFY_CONFIG")]
        config: PathBuf,

        /// Path to alert event file
        #[arg(short, long)]
        event: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    match cli.command {
        Commands::Fields => print_json(&requested_configuration())?,
        Commands::Validate { config } => validate(&config)?,
        Commands::Attributes { config } => {
            let config = load_config(&config)?;
            print_json(&config.attributes())?;
        }
        Commands::Render { config, event } => {
            let adapter = IncidentAdapter::initialize(load_config(&config)?)?;
            print_json(&adapter.render(&load_event(&event)?))?;
        }
        Commands::Send { config, event } => send(&config, &event)?,
    }

    Ok(())
}

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("topdesk_notify=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<IncidentConfig> {
    IncidentConfig::from_file(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

fn load_event(path: &Path) -> anyhow::Result<AlertEvent> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse event from {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn validate(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    match topdesk_notify::validate(&config) {
        Ok(()) => {
            println!("configuration is valid");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "invalid configuration");
            anyhow::bail!("{e}")
        }
    }
}

fn send(config_path: &Path, event_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let event = load_event(event_path)?;
    let adapter = IncidentAdapter::initialize(config)?;

    info!(
        adapter = adapter.name(),
        stream = %event.stream_title,
        "sending alert"
    );

    match adapter.call(&event)? {
        SubmissionOutcome::Created { response } => {
            println!("{response}");
            Ok(())
        }
        SubmissionOutcome::Aborted { category, name } => {
            anyhow::bail!("no {category} named '{name}' in TOPdesk, incident not created")
        }
    }
}
