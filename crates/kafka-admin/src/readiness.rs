//! Waiting for submitted topics to become visible.

use crate::admin::BrokerAdmin;
use crate::error::{KafkaAdminError, Result};
use crate::executor::AdminExecutor;
use crate::topic::TopicListing;
use retry_policy::PollState;
use tracing::{debug, info, warn};

/// Re-lists topics until every required name is observed.
///
/// Topics are confirmed one after the other, each with its own attempt
/// budget, so the worst-case wait is the sum over all topics.
pub struct TopicReadinessPoller<'a, A: ?Sized> {
    executor: &'a AdminExecutor<'a, A>,
}

fn is_topic_created(listing: Option<&TopicListing>, topic: &str) -> bool {
    listing.is_some_and(|listing| listing.contains(topic))
}

impl<'a, A: BrokerAdmin + ?Sized> TopicReadinessPoller<'a, A> {
    pub fn new(executor: &'a AdminExecutor<'a, A>) -> Self {
        Self { executor }
    }

    /// Block until every topic in `required` is listed by the broker.
    ///
    /// A missing or empty listing counts as "not there yet" and consumes an
    /// attempt like any other miss.
    pub fn confirm_ready(&self, required: &[String]) -> Result<()> {
        for topic in required {
            let attempts = self.confirm_topic(topic)?;
            info!("Topic '{}' visible after {} checks", topic, attempts);
        }
        Ok(())
    }

    /// Returns the number of listings fetched for `topic`.
    fn confirm_topic(&self, topic: &str) -> Result<u32> {
        let policy = self.executor.policy();
        let mut state = PollState::new(policy);

        loop {
            let listing = self.executor.list_topics()?;
            if is_topic_created(listing.as_ref(), topic) {
                return Ok(state.attempt());
            }

            let checked = state.attempt();
            let Some(wait) = state.advance(policy) else {
                return Err(KafkaAdminError::ReadinessTimeout {
                    topic: topic.to_string(),
                    attempts: checked,
                });
            };

            warn!(
                "Topic '{}' not visible yet (check {}/{}), checking again in {:?}",
                topic, checked, policy.max_attempts, wait
            );
            self.executor.sleeper().sleep(wait)?;
            debug!("Re-reading topics for '{}'", topic);
        }
    }
}
