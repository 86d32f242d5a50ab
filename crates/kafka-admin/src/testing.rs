//! Scripted broker for exercising the admin stages without Kafka.

use crate::admin::BrokerAdmin;
use crate::error::BrokerError;
use crate::topic::{CreateTopicsHandle, TopicListing, TopicSpec};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

type ListResponse = Result<Option<TopicListing>, BrokerError>;
type CreateResponse = Result<CreateTopicsHandle, BrokerError>;

/// A [`BrokerAdmin`] that replays queued responses.
///
/// Once the listing queue is drained, the last listing served is repeated.
/// Once the create queue is drained, every request is accepted.
#[derive(Debug, Default)]
pub struct ScriptedBroker {
    listings: Mutex<VecDeque<ListResponse>>,
    last_listing: Mutex<Option<TopicListing>>,
    creates: Mutex<VecDeque<CreateResponse>>,
    created: Mutex<Vec<TopicSpec>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl ScriptedBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a listing containing `names`.
    pub fn then_list(self, names: &[&str]) -> Self {
        self.push_listing(Ok(Some(names.iter().copied().collect())))
    }

    /// Queue a response without any listing.
    pub fn then_list_nothing(self) -> Self {
        self.push_listing(Ok(None))
    }

    pub fn then_list_error(self, err: BrokerError) -> Self {
        self.push_listing(Err(err))
    }

    pub fn then_create_error(self, err: BrokerError) -> Self {
        lock(&self.creates).push_back(Err(err));
        self
    }

    fn push_listing(self, response: ListResponse) -> Self {
        lock(&self.listings).push_back(response);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Specs passed to the last create call.
    pub fn created_specs(&self) -> Vec<TopicSpec> {
        lock(&self.created).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BrokerAdmin for ScriptedBroker {
    fn create_topics(&self, specs: &[TopicSpec]) -> Result<CreateTopicsHandle, BrokerError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.created) = specs.to_vec();
        match lock(&self.creates).pop_front() {
            Some(response) => response,
            None => Ok(CreateTopicsHandle::accepting(specs)),
        }
    }

    fn list_topics(&self) -> Result<Option<TopicListing>, BrokerError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.listings).pop_front() {
            Some(Ok(Some(listing))) => {
                *lock(&self.last_listing) = Some(listing.clone());
                Ok(Some(listing))
            }
            Some(response) => response,
            None => Ok(lock(&self.last_listing).clone()),
        }
    }
}
