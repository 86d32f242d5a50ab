//! kafka-stream-init
//!
//! Startup gate for a service that produces into Kafka. Before the service
//! may publish anything it must:
//!
//! - submit creation of its topics,
//! - see every topic in the broker's listing (creation is asynchronous),
//! - get a 2xx from the schema registry.
//!
//! Every stage blocks the calling thread and retries with a growing wait
//! bounded by `max-attempts`. When any stage gives up,
//! `StartupOrchestrator::ensure_ready` returns a `StartupFailure` and the
//! process must not go on to serve traffic.
//!
//! # Crates
//!
//! - `retry_policy` - `RetryPolicy`, backoff, `with_retry`, interruptible sleep
//! - `kafka_admin` - broker capability, rdkafka adapter, admin executor, readiness poller
//!
//! # CLI Usage
//!
//! ```bash
//! # Gate on the topics and registry from a config file
//! kafka-stream-init --config config/stream-init.yml
//!
//! # Override the brokers, skip the schema registry
//! kafka-stream-init --config config/stream-init.yml \
//!   --bootstrap-servers kafka:9092 --skip-schema-registry
//! ```

pub mod config;
pub mod health;
pub mod startup;

// Re-export workspace crates for convenience
pub use kafka_admin as admin;
pub use retry_policy as retry;

pub use config::{ConfigError, KafkaConfig, StartupConfig};
pub use health::{DependencyHealthPoller, HealthError, HealthProbe, HealthStatus, HttpProbe};
pub use startup::{
    Ready, StartupError, StartupFailure, StartupOrchestrator, StartupStage, StartupState,
};
