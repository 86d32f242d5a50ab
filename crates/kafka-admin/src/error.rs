//! Error types for Kafka administration.

use retry_policy::{Interrupted, RetryError};
use std::fmt;
use thiserror::Error;

/// Failure of a single broker call.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Broker unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid admin request: {0}")]
    InvalidRequest(String),
}

impl BrokerError {
    /// Whether retrying the same call may succeed.
    ///
    /// Client and request construction failures are configuration problems
    /// and fail on every attempt.
    pub fn is_transient(&self) -> bool {
        use rdkafka::error::KafkaError;

        match self {
            BrokerError::Kafka(KafkaError::ClientCreation(_))
            | BrokerError::Kafka(KafkaError::AdminOpCreation(_)) => false,
            BrokerError::Kafka(_) => true,
            BrokerError::Unavailable(_) => true,
            BrokerError::InvalidRequest(_) => false,
        }
    }
}

/// The admin call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOperation {
    CreateTopics,
    ListTopics,
}

impl fmt::Display for AdminOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminOperation::CreateTopics => f.write_str("creating kafka topics"),
            AdminOperation::ListTopics => f.write_str("reading kafka topics"),
        }
    }
}

/// Terminal failures of the admin stages.
#[derive(Error, Debug)]
pub enum KafkaAdminError {
    /// A broker call kept failing until the retry budget ran out, or failed
    /// in a way retrying cannot fix.
    #[error("Gave up {operation} after {attempts} attempts: {source}")]
    AdminOperation {
        operation: AdminOperation,
        attempts: u32,
        #[source]
        source: BrokerError,
    },

    /// A required topic never showed up in the broker's listing.
    #[error("Topic '{topic}' not visible after {attempts} attempts")]
    ReadinessTimeout { topic: String, attempts: u32 },

    #[error("Interrupted while waiting: {0}")]
    Interrupted(#[from] Interrupted),
}

impl KafkaAdminError {
    pub(crate) fn from_retry(operation: AdminOperation, err: RetryError<BrokerError>) -> Self {
        match err {
            RetryError::Exhausted { attempts, source } => KafkaAdminError::AdminOperation {
                operation,
                attempts,
                source,
            },
            RetryError::Aborted { attempt, source } => KafkaAdminError::AdminOperation {
                operation,
                attempts: attempt,
                source,
            },
            RetryError::Interrupted(interrupted) => KafkaAdminError::Interrupted(interrupted),
        }
    }

    pub fn attempts(&self) -> Option<u32> {
        match self {
            KafkaAdminError::AdminOperation { attempts, .. }
            | KafkaAdminError::ReadinessTimeout { attempts, .. } => Some(*attempts),
            KafkaAdminError::Interrupted(_) => None,
        }
    }
}

/// Result type alias for Kafka admin operations.
pub type Result<T> = std::result::Result<T, KafkaAdminError>;
