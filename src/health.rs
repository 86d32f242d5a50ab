//! Dependency health polling.
//!
//! Used to wait for the schema registry: the service and the registry are
//! usually started together, so the registry may not answer yet when the
//! service boots.

use retry_policy::{Interrupted, PollState, RetryPolicy, Sleeper};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP status a probe observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStatus(u16);

impl HealthStatus {
    pub const OK: HealthStatus = HealthStatus(200);

    /// Reported for transport faults (connection refused, timeout, ...).
    pub const SERVICE_UNAVAILABLE: HealthStatus = HealthStatus(503);

    pub fn from_code(code: u16) -> Self {
        Self(code)
    }

    pub fn code(&self) -> u16 {
        self.0
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.0)
    }
}

/// A liveness check against an external dependency.
///
/// Must never fail: faults are reported as an unhealthy status.
pub trait HealthProbe {
    fn probe(&self) -> HealthStatus;

    /// Name of the probed dependency, for logs and errors.
    fn target(&self) -> &str {
        "dependency"
    }
}

impl<F> HealthProbe for F
where
    F: Fn() -> HealthStatus,
{
    fn probe(&self) -> HealthStatus {
        self()
    }
}

/// Probes a URL with a blocking `GET`.
pub struct HttpProbe {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl HealthProbe for HttpProbe {
    fn probe(&self) -> HealthStatus {
        match self.client.get(&self.url).send() {
            Ok(response) => HealthStatus::from_code(response.status().as_u16()),
            Err(e) => {
                debug!("GET {} failed: {}", self.url, e);
                HealthStatus::SERVICE_UNAVAILABLE
            }
        }
    }

    fn target(&self) -> &str {
        &self.url
    }
}

/// Error type for health polling.
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("{target} still unhealthy after {attempts} attempts (last status: {last_status})")]
    DependencyUnhealthy {
        target: String,
        attempts: u32,
        last_status: HealthStatus,
    },

    #[error("Interrupted while waiting for dependency: {0}")]
    Interrupted(#[from] Interrupted),
}

/// Repeats a probe with growing waits until it reports success.
pub struct DependencyHealthPoller<'a> {
    policy: &'a RetryPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a> DependencyHealthPoller<'a> {
    pub fn new(policy: &'a RetryPolicy, sleeper: &'a dyn Sleeper) -> Self {
        Self { policy, sleeper }
    }

    /// Block until `probe` reports 2xx. Returns the number of probes issued.
    pub fn wait_until_healthy<P: HealthProbe + ?Sized>(&self, probe: &P) -> Result<u32, HealthError> {
        let mut state = PollState::new(self.policy);

        loop {
            let status = probe.probe();
            if status.is_success() {
                info!(
                    "{} is healthy after {} attempts",
                    probe.target(),
                    state.attempt()
                );
                return Ok(state.attempt());
            }

            let checked = state.attempt();
            let Some(wait) = state.advance(self.policy) else {
                return Err(HealthError::DependencyUnhealthy {
                    target: probe.target().to_string(),
                    attempts: checked,
                    last_status: status,
                });
            };

            warn!(
                "{} answered {} (attempt {}/{}), retrying in {:?}",
                probe.target(),
                status,
                checked,
                self.policy.max_attempts,
                wait
            );
            self.sleeper.sleep(wait)?;
        }
    }
}
