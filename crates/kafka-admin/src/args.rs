//! CLI argument definitions for broker administration.

use clap::Args;

/// Kafka admin arguments. Each one overrides the matching config file value.
#[derive(Args, Clone, Debug, Default)]
pub struct KafkaAdminArgs {
    /// Kafka brokers (comma-separated, e.g., "localhost:9092")
    #[arg(long, env = "KAFKA_BROKERS")]
    pub bootstrap_servers: Option<String>,

    /// Timeout for a single admin request in milliseconds
    #[arg(long, env = "KAFKA_ADMIN_TIMEOUT_MS")]
    pub admin_timeout_ms: Option<u64>,
}
