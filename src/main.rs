//! Command-line interface for kafka-stream-init
//!
//! Runs the startup gate once and exits 0 when the service may start
//! producing, 1 otherwise.
//!
//! ```bash
//! RUST_LOG=info kafka-stream-init --config config/stream-init.yml
//! ```

use anyhow::Context;
use clap::Parser;
use kafka_stream_init::admin::{KafkaAdminArgs, KafkaBrokerAdmin};
use kafka_stream_init::retry::Interrupter;
use kafka_stream_init::{HttpProbe, Ready, StartupConfig, StartupOrchestrator};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kafka-stream-init")]
#[command(about = "Ensure Kafka topics and the schema registry are ready before producing")]
#[command(long_about = None)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, env = "STREAM_INIT_CONFIG", value_name = "PATH")]
    config: PathBuf,

    /// Kafka admin options
    #[command(flatten)]
    kafka: KafkaAdminArgs,

    /// Schema registry URL to probe (overrides the config file)
    #[arg(long, env = "SCHEMA_REGISTRY_URL")]
    schema_registry_url: Option<String>,

    /// Do not wait for the schema registry
    #[arg(long)]
    skip_schema_registry: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = StartupConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    config.apply_overrides(&cli.kafka, cli.schema_registry_url.as_deref());
    config.validate().context("Invalid configuration after overrides")?;

    tracing::info!(
        "Starting stream init for {} topics on {}",
        config.kafka_config.topic_names_to_create.len(),
        config.kafka_config.bootstrap_servers
    );

    let interrupter = Interrupter::new();
    let sleeper = interrupter.sleeper();
    let skip_schema_registry = cli.skip_schema_registry;

    // The gate blocks, so it runs off the async workers while Ctrl-C is watched here.
    let mut gate = tokio::task::spawn_blocking(move || -> anyhow::Result<Ready> {
        let kafka = &config.kafka_config;
        let admin = KafkaBrokerAdmin::new(&kafka.bootstrap_servers, kafka.admin_timeout())
            .context("Failed to create Kafka admin client")?;
        let probe = if skip_schema_registry {
            None
        } else {
            Some(
                HttpProbe::new(&kafka.schema_registry_url, kafka.probe_timeout())
                    .context("Failed to create schema registry probe")?,
            )
        };

        let mut orchestrator = StartupOrchestrator::new(
            config.retry_config.clone(),
            kafka.topic_specs(),
            admin,
            probe,
            sleeper,
        );
        Ok(orchestrator.ensure_ready()?)
    });

    let ready = tokio::select! {
        joined = &mut gate => joined??,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupt received, aborting startup");
            interrupter.interrupt();
            gate.await??
        }
    };

    println!("Ready: topics {:?}", ready.topics);
    Ok(())
}
