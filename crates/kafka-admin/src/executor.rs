//! Admin calls wrapped in a bounded retry.

use crate::admin::BrokerAdmin;
use crate::error::{AdminOperation, BrokerError, KafkaAdminError, Result};
use crate::topic::{CreateTopicsHandle, TopicListing, TopicSpec};
use retry_policy::{with_retry, RetryPolicy, Sleeper};
use tracing::{debug, info};

/// Issues admin calls, retrying transient broker failures with a capped
/// exponential backoff up to `max_attempts` times.
pub struct AdminExecutor<'a, A: ?Sized> {
    admin: &'a A,
    policy: &'a RetryPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a, A: BrokerAdmin + ?Sized> AdminExecutor<'a, A> {
    pub fn new(admin: &'a A, policy: &'a RetryPolicy, sleeper: &'a dyn Sleeper) -> Self {
        Self {
            admin,
            policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &'a RetryPolicy {
        self.policy
    }

    pub fn sleeper(&self) -> &'a dyn Sleeper {
        self.sleeper
    }

    /// Submit creation of `specs`.
    ///
    /// Returns once the broker accepted the request; the topics may not be
    /// visible yet.
    pub fn create_topics(&self, specs: &[TopicSpec]) -> Result<CreateTopicsHandle> {
        with_retry(self.policy, self.sleeper, BrokerError::is_transient, |ctx| {
            info!("Creating {} topics, attempt {}", specs.len(), ctx.attempt);
            self.admin.create_topics(specs)
        })
        .map_err(|err| KafkaAdminError::from_retry(AdminOperation::CreateTopics, err))
    }

    /// Fetch a fresh topic listing.
    pub fn list_topics(&self) -> Result<Option<TopicListing>> {
        let listing = with_retry(self.policy, self.sleeper, BrokerError::is_transient, |ctx| {
            info!("Reading kafka topics, attempt {}", ctx.attempt);
            self.admin.list_topics()
        })
        .map_err(|err| KafkaAdminError::from_retry(AdminOperation::ListTopics, err))?;

        if let Some(listing) = &listing {
            debug!("Listing holds {} topics", listing.len());
            for name in listing.names() {
                debug!("Topic with name {}", name);
            }
        }

        Ok(listing)
    }
}
