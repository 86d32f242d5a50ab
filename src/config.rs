//! Startup configuration loaded once from YAML.
//!
//! ```yaml
//! retry-config:
//!   initial-interval-ms: 1000
//!   max-interval-ms: 10000
//!   multiplier: 2.0
//!   max-attempts: 3
//!   sleep-time-ms: 2000
//! kafka-config:
//!   bootstrap-servers: localhost:19092
//!   schema-registry-url: http://localhost:8081
//!   topic-names-to-create:
//!     - twitter-topic
//!   num-of-partitions: 3
//!   replication-factor: 3
//! ```

use kafka_admin::{KafkaAdminArgs, TopicSpec};
use retry_policy::{PolicyError, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid retry-config: {0}")]
    InvalidPolicy(#[from] PolicyError),

    #[error("kafka-config.topic-names-to-create has no topics")]
    NoTopics,

    #[error("kafka-config.{0} must not be empty")]
    Empty(&'static str),
}

/// Everything the startup gate needs, read before it starts and never again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StartupConfig {
    pub retry_config: RetryPolicy,
    pub kafka_config: KafkaConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KafkaConfig {
    pub bootstrap_servers: String,

    /// Probed until it answers 2xx.
    pub schema_registry_url: String,

    pub topic_names_to_create: Vec<String>,

    #[serde(default = "default_partitions")]
    pub num_of_partitions: u32,

    #[serde(default = "default_replication_factor")]
    pub replication_factor: u32,

    #[serde(default = "default_timeout_ms")]
    pub admin_timeout_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_partitions() -> u32 {
    3
}

fn default_replication_factor() -> u32 {
    1
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl KafkaConfig {
    /// One spec per configured topic name, names trimmed.
    pub fn topic_specs(&self) -> Vec<TopicSpec> {
        self.topic_names_to_create
            .iter()
            .map(|name| TopicSpec::new(name, self.num_of_partitions, self.replication_factor))
            .collect()
    }

    pub fn admin_timeout(&self) -> Duration {
        Duration::from_millis(self.admin_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl StartupConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: StartupConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry_config.validate()?;

        let kafka = &self.kafka_config;
        if kafka.bootstrap_servers.trim().is_empty() {
            return Err(ConfigError::Empty("bootstrap-servers"));
        }
        if kafka.schema_registry_url.trim().is_empty() {
            return Err(ConfigError::Empty("schema-registry-url"));
        }
        if kafka.topic_names_to_create.is_empty() {
            return Err(ConfigError::NoTopics);
        }
        if kafka
            .topic_names_to_create
            .iter()
            .any(|name| name.trim().is_empty())
        {
            return Err(ConfigError::Empty("topic-names-to-create"));
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the file values.
    pub fn apply_overrides(&mut self, args: &KafkaAdminArgs, schema_registry_url: Option<&str>) {
        if let Some(servers) = &args.bootstrap_servers {
            self.kafka_config.bootstrap_servers = servers.clone();
        }
        if let Some(timeout_ms) = args.admin_timeout_ms {
            self.kafka_config.admin_timeout_ms = timeout_ms;
        }
        if let Some(url) = schema_registry_url {
            self.kafka_config.schema_registry_url = url.to_string();
        }
    }
}
