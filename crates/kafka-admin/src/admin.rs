//! The broker capability the startup gate depends on.

use crate::error::BrokerError;
use crate::topic::{CreateTopicsHandle, TopicListing, TopicSpec};

/// Synchronous administrative access to a broker.
///
/// Implementations may reuse connections between calls; callers treat them
/// as stateless and never call them concurrently.
pub trait BrokerAdmin {
    /// Submit creation of `specs`. Success means the request was accepted,
    /// not that the topics are visible yet.
    fn create_topics(&self, specs: &[TopicSpec]) -> Result<CreateTopicsHandle, BrokerError>;

    /// Current topic names. `None` when the broker answered without a listing.
    fn list_topics(&self) -> Result<Option<TopicListing>, BrokerError>;
}

impl<A: BrokerAdmin + ?Sized> BrokerAdmin for &A {
    fn create_topics(&self, specs: &[TopicSpec]) -> Result<CreateTopicsHandle, BrokerError> {
        (**self).create_topics(specs)
    }

    fn list_topics(&self) -> Result<Option<TopicListing>, BrokerError> {
        (**self).list_topics()
    }
}
