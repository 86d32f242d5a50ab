//! Kafka topic administration for the startup gate.
//!
//! This crate provides:
//! - `BrokerAdmin`: the broker capability (create topics, list topics)
//! - `KafkaBrokerAdmin`: the rdkafka-backed implementation
//! - `AdminExecutor`: admin calls wrapped in a bounded retry with capped exponential backoff
//! - `TopicReadinessPoller`: waits until every required topic is visible
//!
//! # Why two stages
//!
//! Topic creation in Kafka is asynchronous. A successful `create_topics` only
//! means the broker accepted the request, so the readiness poller re-lists
//! topics until each required name shows up.
//!
//! ```text
//! AdminExecutor::create_topics ──► TopicReadinessPoller::confirm_ready
//!        │                                   │
//!        └──────── with_retry ───────────────┴── list_topics (fresh every check)
//! ```

pub mod admin;
pub mod args;
pub mod client;
pub mod error;
pub mod executor;
pub mod readiness;
pub mod testing;
pub mod topic;

#[cfg(test)]
mod tests;

pub use admin::BrokerAdmin;
pub use args::KafkaAdminArgs;
pub use client::KafkaBrokerAdmin;
pub use error::{AdminOperation, BrokerError, KafkaAdminError, Result};
pub use executor::AdminExecutor;
pub use readiness::TopicReadinessPoller;
pub use topic::{CreateTopicsHandle, TopicListing, TopicSpec};
