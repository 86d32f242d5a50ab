//! Topic types exchanged with the broker.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A topic the service needs before it may produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSpec {
    pub name: String,
    pub partition_count: u32,
    pub replication_factor: u32,
}

impl TopicSpec {
    /// Build a spec, trimming whitespace around the name.
    pub fn new(name: &str, partition_count: u32, replication_factor: u32) -> Self {
        Self {
            name: name.trim().to_string(),
            partition_count,
            replication_factor,
        }
    }
}

/// Topic names the broker reported at one point in time.
///
/// Never cached: every readiness check fetches a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicListing {
    names: BTreeSet<String>,
}

impl TopicListing {
    pub fn contains(&self, topic: &str) -> bool {
        self.names.contains(topic)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TopicListing {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// What the broker said about a create request.
///
/// Acceptance is not visibility; see `TopicReadinessPoller`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTopicsHandle {
    /// Topics whose creation the broker accepted.
    pub accepted: Vec<String>,
    /// Topics that already existed.
    pub already_existing: Vec<String>,
    /// Topics the broker refused, with the broker's reason.
    pub rejected: Vec<(String, String)>,
}

impl CreateTopicsHandle {
    /// A handle where every requested topic was accepted.
    pub fn accepting(specs: &[TopicSpec]) -> Self {
        Self {
            accepted: specs.iter().map(|spec| spec.name.clone()).collect(),
            ..Default::default()
        }
    }

    pub fn submitted(&self) -> usize {
        self.accepted.len() + self.already_existing.len() + self.rejected.len()
    }
}
