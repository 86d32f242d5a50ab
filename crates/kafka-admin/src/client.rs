//! rdkafka-backed broker admin.

use crate::admin::BrokerAdmin;
use crate::error::BrokerError;
use crate::topic::{CreateTopicsHandle, TopicListing, TopicSpec};
use futures::executor::block_on;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for a single admin request.
pub const DEFAULT_ADMIN_TIMEOUT: Duration = Duration::from_secs(5);

/// [`BrokerAdmin`] over an rdkafka `AdminClient`.
///
/// The admin futures are resolved by rdkafka's own polling thread, so each
/// call simply blocks on its future.
pub struct KafkaBrokerAdmin {
    client: AdminClient<DefaultClientContext>,
    options: AdminOptions,
    request_timeout: Duration,
    bootstrap_servers: String,
}

impl KafkaBrokerAdmin {
    /// Create an admin client for `bootstrap_servers` (e.g. "localhost:9092").
    pub fn new(bootstrap_servers: &str, request_timeout: Duration) -> Result<Self, BrokerError> {
        let client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .create()?;

        let options = AdminOptions::new()
            .operation_timeout(Some(request_timeout))
            .request_timeout(Some(request_timeout));

        Ok(Self {
            client,
            options,
            request_timeout,
            bootstrap_servers: bootstrap_servers.to_string(),
        })
    }

    pub fn bootstrap_servers(&self) -> &str {
        &self.bootstrap_servers
    }
}

fn to_i32(value: u32, what: &str, topic: &str) -> Result<i32, BrokerError> {
    i32::try_from(value)
        .map_err(|_| BrokerError::InvalidRequest(format!("{what} {value} for topic '{topic}'")))
}

impl BrokerAdmin for KafkaBrokerAdmin {
    fn create_topics(&self, specs: &[TopicSpec]) -> Result<CreateTopicsHandle, BrokerError> {
        let new_topics = specs
            .iter()
            .map(|spec| {
                let partitions = to_i32(spec.partition_count, "partition count", &spec.name)?;
                let replication =
                    to_i32(spec.replication_factor, "replication factor", &spec.name)?;
                Ok(NewTopic::new(
                    &spec.name,
                    partitions,
                    TopicReplication::Fixed(replication),
                ))
            })
            .collect::<Result<Vec<_>, BrokerError>>()?;

        let results = block_on(self.client.create_topics(&new_topics, &self.options))?;

        let mut handle = CreateTopicsHandle::default();
        for result in results {
            match result {
                Ok(topic_name) => {
                    info!("Topic '{}' creation accepted", topic_name);
                    handle.accepted.push(topic_name);
                }
                Err((topic_name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    info!("Topic '{}' already exists", topic_name);
                    handle.already_existing.push(topic_name);
                }
                Err((topic_name, code)) => {
                    warn!("Broker rejected topic '{}': {}", topic_name, code);
                    handle.rejected.push((topic_name, code.to_string()));
                }
            }
        }

        Ok(handle)
    }

    fn list_topics(&self) -> Result<Option<TopicListing>, BrokerError> {
        let metadata = self
            .client
            .inner()
            .fetch_metadata(None, self.request_timeout)?;

        let listing: TopicListing = metadata
            .topics()
            .iter()
            .map(|topic| topic.name().to_string())
            .collect();
        debug!(
            "Broker {} reported {} topics",
            self.bootstrap_servers,
            listing.len()
        );

        Ok(Some(listing))
    }
}
