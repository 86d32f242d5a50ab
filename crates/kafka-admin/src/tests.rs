//! Unit tests for the admin executor and the readiness poller.

use std::time::Duration;

use retry_policy::testing::RecordingSleeper;
use retry_policy::RetryPolicy;

use crate::testing::ScriptedBroker;
use crate::{
    AdminExecutor, AdminOperation, BrokerError, KafkaAdminError, TopicReadinessPoller, TopicSpec,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn topics(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn confirm(
    broker: &ScriptedBroker,
    policy: &RetryPolicy,
    sleeper: &RecordingSleeper,
    required: &[&str],
) -> Result<(), KafkaAdminError> {
    let executor = AdminExecutor::new(broker, policy, sleeper);
    TopicReadinessPoller::new(&executor).confirm_ready(&topics(required))
}

// ============================================================================
// Readiness poller
// ============================================================================

#[test]
fn test_missing_topic_times_out_after_max_attempts() {
    let policy = RetryPolicy::new(100, 10_000, 2.0, 3);
    let broker = ScriptedBroker::new().then_list(&[]);
    let sleeper = RecordingSleeper::new();

    let result = confirm(&broker, &policy, &sleeper, &["orders"]);

    match result {
        Err(KafkaAdminError::ReadinessTimeout { topic, attempts }) => {
            assert_eq!(topic, "orders");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected ReadinessTimeout, got {other:?}"),
    }
    assert_eq!(broker.list_calls(), 3, "no fourth check after the budget");
    assert_eq!(sleeper.waits(), vec![ms(100), ms(200)]);
}

#[test]
fn test_topic_found_on_kth_attempt_fetches_k_listings() {
    for k in 1..=4u32 {
        let policy = RetryPolicy::new(10, 10_000, 2.0, 4);
        let mut broker = ScriptedBroker::new();
        for _ in 1..k {
            broker = broker.then_list(&["unrelated"]);
        }
        let broker = broker.then_list(&["unrelated", "orders"]);
        let sleeper = RecordingSleeper::new();

        confirm(&broker, &policy, &sleeper, &["orders"]).unwrap();

        assert_eq!(broker.list_calls(), k as usize);
        assert_eq!(sleeper.waits().len(), (k - 1) as usize);
    }
}

#[test]
fn test_empty_listing_behaves_like_listing_without_topic() {
    let policy = RetryPolicy::new(50, 10_000, 3.0, 4);

    let empty = ScriptedBroker::new().then_list(&[]);
    let empty_sleeper = RecordingSleeper::new();
    let empty_result = confirm(&empty, &policy, &empty_sleeper, &["orders"]);

    let other = ScriptedBroker::new().then_list(&["payments"]);
    let other_sleeper = RecordingSleeper::new();
    let other_result = confirm(&other, &policy, &other_sleeper, &["orders"]);

    assert_eq!(format!("{empty_result:?}"), format!("{other_result:?}"));
    assert_eq!(empty.list_calls(), other.list_calls());
    assert_eq!(empty_sleeper.waits(), other_sleeper.waits());
}

#[test]
fn test_no_listing_consumes_an_attempt() {
    let policy = RetryPolicy::new(100, 10_000, 2.0, 3);
    let broker = ScriptedBroker::new()
        .then_list_nothing()
        .then_list(&["orders"]);
    let sleeper = RecordingSleeper::new();

    confirm(&broker, &policy, &sleeper, &["orders"]).unwrap();

    assert_eq!(broker.list_calls(), 2);
    assert_eq!(sleeper.waits(), vec![ms(100)]);
}

#[test]
fn test_topics_are_confirmed_one_after_another() {
    let policy = RetryPolicy::new(100, 10_000, 2.0, 5);
    let broker = ScriptedBroker::new()
        .then_list(&[])
        .then_list(&["a"])
        .then_list(&["a"])
        .then_list(&["a", "b"]);
    let sleeper = RecordingSleeper::new();

    confirm(&broker, &policy, &sleeper, &["a", "b"]).unwrap();

    assert_eq!(broker.list_calls(), 4);
    // Each topic starts a fresh backoff.
    assert_eq!(sleeper.waits(), vec![ms(100), ms(100)]);
}

#[test]
fn test_polling_backoff_is_not_capped_by_default() {
    let policy = RetryPolicy::new(100, 150, 2.0, 4);
    let broker = ScriptedBroker::new().then_list(&[]);
    let sleeper = RecordingSleeper::new();

    let _ = confirm(&broker, &policy, &sleeper, &["orders"]);

    assert_eq!(sleeper.waits(), vec![ms(100), ms(200), ms(400)]);
}

#[test]
fn test_polling_backoff_capped_when_clamped() {
    let policy = RetryPolicy::new(100, 150, 2.0, 4).with_clamped_polling(true);
    let broker = ScriptedBroker::new().then_list(&[]);
    let sleeper = RecordingSleeper::new();

    let _ = confirm(&broker, &policy, &sleeper, &["orders"]);

    assert_eq!(sleeper.waits(), vec![ms(100), ms(150), ms(150)]);
}

#[test]
fn test_sleep_time_seeds_polling_interval() {
    let policy = RetryPolicy::new(100, 10_000, 2.0, 3).with_sleep_time_ms(2_000);
    let broker = ScriptedBroker::new().then_list(&[]).then_list(&["orders"]);
    let sleeper = RecordingSleeper::new();

    confirm(&broker, &policy, &sleeper, &["orders"]).unwrap();

    assert_eq!(sleeper.waits(), vec![ms(2_000)]);
}

#[test]
fn test_interrupted_poll_aborts_without_another_fetch() {
    let policy = RetryPolicy::new(100, 10_000, 2.0, 5);
    let broker = ScriptedBroker::new().then_list(&[]);
    let sleeper = RecordingSleeper::interrupting_on(1);

    let result = confirm(&broker, &policy, &sleeper, &["orders"]);

    assert!(matches!(result, Err(KafkaAdminError::Interrupted(_))));
    assert_eq!(broker.list_calls(), 1);
}

#[test]
fn test_listing_failure_is_retried_inside_one_check() {
    let policy = RetryPolicy::new(100, 10_000, 2.0, 3);
    let broker = ScriptedBroker::new()
        .then_list_error(BrokerError::Unavailable("leader not available".into()))
        .then_list(&["orders"]);
    let sleeper = RecordingSleeper::new();

    confirm(&broker, &policy, &sleeper, &["orders"]).unwrap();

    // One executor retry, no poller wait.
    assert_eq!(broker.list_calls(), 2);
    assert_eq!(sleeper.waits(), vec![ms(100)]);
}

#[test]
fn test_exhausted_listing_retries_fail_the_poller() {
    let policy = RetryPolicy::new(100, 10_000, 2.0, 2);
    let broker = ScriptedBroker::new()
        .then_list_error(BrokerError::Unavailable("down".into()))
        .then_list_error(BrokerError::Unavailable("still down".into()));
    let sleeper = RecordingSleeper::new();

    let result = confirm(&broker, &policy, &sleeper, &["orders"]);

    match result {
        Err(KafkaAdminError::AdminOperation {
            operation,
            attempts,
            source,
        }) => {
            assert_eq!(operation, AdminOperation::ListTopics);
            assert_eq!(attempts, 2);
            assert!(source.to_string().contains("still down"));
        }
        other => panic!("expected AdminOperation, got {other:?}"),
    }
}

// ============================================================================
// Admin executor
// ============================================================================

#[test]
fn test_create_topics_passes_specs_through() {
    let policy = RetryPolicy::new(100, 1_000, 2.0, 3);
    let broker = ScriptedBroker::new();
    let sleeper = RecordingSleeper::new();
    let executor = AdminExecutor::new(&broker, &policy, &sleeper);
    let specs = vec![TopicSpec::new("a", 3, 1), TopicSpec::new("b", 1, 1)];

    let handle = executor.create_topics(&specs).unwrap();

    assert_eq!(handle.accepted, topics(&["a", "b"]));
    assert_eq!(broker.created_specs(), specs);
    assert_eq!(broker.create_calls(), 1);
    assert!(sleeper.waits().is_empty());
}

#[test]
fn test_create_topics_retries_transient_failures_with_capped_backoff() {
    let policy = RetryPolicy::new(400, 1_000, 3.0, 4);
    let broker = ScriptedBroker::new()
        .then_create_error(BrokerError::Unavailable("timeout".into()))
        .then_create_error(BrokerError::Unavailable("timeout".into()))
        .then_create_error(BrokerError::Unavailable("timeout".into()));
    let sleeper = RecordingSleeper::new();
    let executor = AdminExecutor::new(&broker, &policy, &sleeper);

    executor
        .create_topics(&[TopicSpec::new("a", 1, 1)])
        .unwrap();

    assert_eq!(broker.create_calls(), 4);
    assert_eq!(sleeper.waits(), vec![ms(400), ms(1_000), ms(1_000)]);
}

#[test]
fn test_create_topics_gives_up_after_budget() {
    let policy = RetryPolicy::new(100, 1_000, 2.0, 2);
    let broker = ScriptedBroker::new()
        .then_create_error(BrokerError::Unavailable("timeout".into()))
        .then_create_error(BrokerError::Unavailable("timeout".into()));
    let sleeper = RecordingSleeper::new();
    let executor = AdminExecutor::new(&broker, &policy, &sleeper);

    let err = executor
        .create_topics(&[TopicSpec::new("a", 1, 1)])
        .unwrap_err();

    assert!(matches!(
        err,
        KafkaAdminError::AdminOperation {
            operation: AdminOperation::CreateTopics,
            attempts: 2,
            ..
        }
    ));
    assert_eq!(err.attempts(), Some(2));
}

#[test]
fn test_invalid_request_is_not_retried() {
    let policy = RetryPolicy::new(100, 1_000, 2.0, 5);
    let broker = ScriptedBroker::new()
        .then_create_error(BrokerError::InvalidRequest("replication factor".into()));
    let sleeper = RecordingSleeper::new();
    let executor = AdminExecutor::new(&broker, &policy, &sleeper);

    let err = executor
        .create_topics(&[TopicSpec::new("a", 1, 1)])
        .unwrap_err();

    assert_eq!(err.attempts(), Some(1));
    assert_eq!(broker.create_calls(), 1);
    assert!(sleeper.waits().is_empty());
}

#[test]
fn test_transient_classification() {
    use rdkafka::error::KafkaError;
    use rdkafka::types::RDKafkaErrorCode;

    assert!(BrokerError::Unavailable("x".into()).is_transient());
    assert!(BrokerError::Kafka(KafkaError::MetadataFetch(
        RDKafkaErrorCode::BrokerTransportFailure
    ))
    .is_transient());
    assert!(!BrokerError::Kafka(KafkaError::ClientCreation("bad config".into())).is_transient());
    assert!(!BrokerError::InvalidRequest("x".into()).is_transient());
}
