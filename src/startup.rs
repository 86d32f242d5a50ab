//! The startup gate: topics submitted, topics visible, dependency healthy.

use crate::health::{DependencyHealthPoller, HealthError, HealthProbe, HealthStatus};
use kafka_admin::{AdminExecutor, BrokerAdmin, KafkaAdminError, TopicReadinessPoller, TopicSpec};
use retry_policy::{Interrupted, RetryPolicy, Sleeper, ThreadSleeper};
use std::fmt;
use thiserror::Error;
use tracing::{error, info, warn};

/// Where the gate is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupState {
    Init,
    TopicsSubmitted,
    TopicsConfirmed,
    DependencyHealthy,
    Ready,
    Failed,
}

impl fmt::Display for StartupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartupState::Init => "init",
            StartupState::TopicsSubmitted => "topics-submitted",
            StartupState::TopicsConfirmed => "topics-confirmed",
            StartupState::DependencyHealthy => "dependency-healthy",
            StartupState::Ready => "ready",
            StartupState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The stage that was running when something went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStage {
    TopicCreation,
    TopicReadiness,
    DependencyHealth,
}

impl fmt::Display for StartupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartupStage::TopicCreation => "topic creation",
            StartupStage::TopicReadiness => "topic readiness",
            StartupStage::DependencyHealth => "dependency health",
        };
        f.write_str(name)
    }
}

/// Why the gate gave up.
#[derive(Debug, Error)]
pub enum StartupError {
    /// A broker admin call failed past its retry budget.
    #[error("Admin operation failed during {stage}: {source}")]
    AdminOperation {
        stage: StartupStage,
        #[source]
        source: KafkaAdminError,
    },

    #[error("Topic '{topic}' not ready after {attempts} attempts")]
    ReadinessTimeout { topic: String, attempts: u32 },

    #[error("{target} unhealthy after {attempts} attempts (last status: {last_status})")]
    DependencyUnhealthy {
        target: String,
        attempts: u32,
        last_status: HealthStatus,
    },

    #[error("Wait interrupted during {stage}")]
    InterruptedWait {
        stage: StartupStage,
        #[source]
        source: Interrupted,
    },
}

impl StartupError {
    fn from_admin(stage: StartupStage, err: KafkaAdminError) -> Self {
        match err {
            KafkaAdminError::ReadinessTimeout { topic, attempts } => {
                StartupError::ReadinessTimeout { topic, attempts }
            }
            KafkaAdminError::Interrupted(source) => StartupError::InterruptedWait { stage, source },
            other => StartupError::AdminOperation {
                stage,
                source: other,
            },
        }
    }

    pub fn stage(&self) -> StartupStage {
        match self {
            StartupError::AdminOperation { stage, .. }
            | StartupError::InterruptedWait { stage, .. } => *stage,
            StartupError::ReadinessTimeout { .. } => StartupStage::TopicReadiness,
            StartupError::DependencyUnhealthy { .. } => StartupStage::DependencyHealth,
        }
    }

    pub fn attempts(&self) -> Option<u32> {
        match self {
            StartupError::AdminOperation { source, .. } => source.attempts(),
            StartupError::ReadinessTimeout { attempts, .. }
            | StartupError::DependencyUnhealthy { attempts, .. } => Some(*attempts),
            StartupError::InterruptedWait { .. } => None,
        }
    }
}

impl From<HealthError> for StartupError {
    fn from(err: HealthError) -> Self {
        match err {
            HealthError::DependencyUnhealthy {
                target,
                attempts,
                last_status,
            } => StartupError::DependencyUnhealthy {
                target,
                attempts,
                last_status,
            },
            HealthError::Interrupted(source) => StartupError::InterruptedWait {
                stage: StartupStage::DependencyHealth,
                source,
            },
        }
    }
}

/// Terminal failure of [`StartupOrchestrator::ensure_ready`].
///
/// The process must not go on to serve traffic.
#[derive(Debug, Error)]
#[error("Startup failed after reaching state '{reached}': {error}")]
pub struct StartupFailure {
    /// Last state reached before the failing stage.
    pub reached: StartupState,
    #[source]
    pub error: StartupError,
}

/// Signal that the service may start producing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ready {
    pub topics: Vec<String>,
    /// `None` when the dependency check was skipped.
    pub dependency: Option<String>,
}

/// Runs the startup stages in order on the calling thread.
///
/// No stage is retried here; each one retries internally. Nothing is rolled
/// back when a later stage fails.
pub struct StartupOrchestrator<A, P, S = ThreadSleeper> {
    policy: RetryPolicy,
    topics: Vec<TopicSpec>,
    admin: A,
    probe: Option<P>,
    sleeper: S,
    state: StartupState,
}

fn transition(state: &mut StartupState, next: StartupState) {
    info!("Startup state {} -> {}", state, next);
    *state = next;
}

impl<A, P, S> StartupOrchestrator<A, P, S>
where
    A: BrokerAdmin,
    P: HealthProbe,
    S: Sleeper,
{
    /// `probe` is `None` when the dependency check is disabled.
    pub fn new(
        policy: RetryPolicy,
        topics: Vec<TopicSpec>,
        admin: A,
        probe: Option<P>,
        sleeper: S,
    ) -> Self {
        Self {
            policy,
            topics,
            admin,
            probe,
            sleeper,
            state: StartupState::Init,
        }
    }

    pub fn state(&self) -> StartupState {
        self.state
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    /// Block until topics exist, are visible, and the dependency is healthy.
    pub fn ensure_ready(&mut self) -> Result<Ready, StartupFailure> {
        if self.state != StartupState::Init {
            warn!("Startup gate invoked again in state {}", self.state);
        }
        self.state = StartupState::Init;

        match self.run_stages() {
            Ok(ready) => {
                transition(&mut self.state, StartupState::Ready);
                info!(
                    "Topics with name {:?} are ready for operations!",
                    ready.topics
                );
                Ok(ready)
            }
            Err(error) => {
                let reached = self.state;
                transition(&mut self.state, StartupState::Failed);
                error!(
                    "Startup aborted during {} (attempts: {:?}): {}",
                    error.stage(),
                    error.attempts(),
                    error
                );
                Err(StartupFailure { reached, error })
            }
        }
    }

    fn run_stages(&mut self) -> Result<Ready, StartupError> {
        let Self {
            policy,
            topics,
            admin,
            probe,
            sleeper,
            state,
        } = self;
        let sleeper: &dyn Sleeper = &*sleeper;
        let executor = AdminExecutor::new(&*admin, &*policy, sleeper);

        let handle = executor
            .create_topics(topics)
            .map_err(|e| StartupError::from_admin(StartupStage::TopicCreation, e))?;
        info!(
            "Submitted {} topics ({} accepted, {} already existing, {} rejected)",
            handle.submitted(),
            handle.accepted.len(),
            handle.already_existing.len(),
            handle.rejected.len()
        );
        transition(state, StartupState::TopicsSubmitted);

        let required: Vec<String> = topics.iter().map(|spec| spec.name.clone()).collect();
        TopicReadinessPoller::new(&executor)
            .confirm_ready(&required)
            .map_err(|e| StartupError::from_admin(StartupStage::TopicReadiness, e))?;
        transition(state, StartupState::TopicsConfirmed);

        let dependency = match probe.as_ref() {
            Some(probe) => {
                DependencyHealthPoller::new(policy, sleeper).wait_until_healthy(probe)?;
                Some(probe.target().to_string())
            }
            None => {
                warn!("Dependency health check disabled, skipping");
                None
            }
        };
        transition(state, StartupState::DependencyHealthy);

        Ok(Ready {
            topics: required,
            dependency,
        })
    }
}
