//! Two-phase submission pipeline
//!
//! ```text
//! Idle -> Validating -> ApplyingConfig -> Starting -> Succeeded
//!             |               |              |
//!             +---------------+--------------+----> Failed(stage, reason)
//! ```
//!
//! `/start` is only dispatched after `/update_params` succeeded; the first
//! failure ends the run. A run that fails while starting leaves the new
//! parameters applied on the backend, which callers can detect through
//! [`LaunchError::parameters_applied`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::client::StrategyApi;
use crate::error::{LaunchError, LaunchResult, RemoteError, ValidationErrors};
use crate::schema;
use crate::types::OrderConfiguration;

/// Working stages of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validating,
    ApplyingConfig,
    Starting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Validating => write!(f, "validating"),
            Stage::ApplyingConfig => write!(f, "applying config (/update_params)"),
            Stage::Starting => write!(f, "starting (/start)"),
        }
    }
}

/// Why a run ended in [`PipelineState::Failed`]
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    Fields(ValidationErrors),
    Remote(RemoteError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Fields(errors) => write!(f, "{}", errors),
            FailureReason::Remote(cause) => write!(f, "{}", cause),
        }
    }
}

/// Combined result of a successful launch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchReceipt {
    pub configuration: OrderConfiguration,
    pub update_response: Value,
    pub start_response: Value,
    pub completed_at: DateTime<Utc>,
}

/// State of the most recent run
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Validating,
    ApplyingConfig,
    Starting,
    Succeeded(LaunchReceipt),
    Failed(Stage, FailureReason),
}

impl PipelineState {
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Failed(stage, _) => Some(*stage),
            _ => None,
        }
    }
}

/// Clears the in-flight flag when a run ends or its future is dropped
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Validates a configuration, applies it remotely, then starts the strategy
///
/// Only one run may be in flight at a time; overlapping calls are rejected
/// with [`LaunchError::SubmissionInProgress`]. Runs share no state besides
/// the last-run report returned by [`state`](Self::state).
pub struct SubmissionPipeline<A> {
    api: A,
    in_flight: AtomicBool,
    state: Mutex<PipelineState>,
}

impl<A: StrategyApi> SubmissionPipeline<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(PipelineState::Idle),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Snapshot of the most recent run
    pub fn state(&self) -> PipelineState {
        self.lock_state().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one submission to completion
    pub async fn submit(&self, config: OrderConfiguration) -> LaunchResult<LaunchReceipt> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("Rejected submission: another submission is in flight");
            return Err(LaunchError::SubmissionInProgress);
        };

        info!(order_type = %config.variant(), symbol = %config.symbol(), "Submitting configuration");

        self.transition(PipelineState::Validating);
        if let Err(errors) = schema::validate(&config) {
            warn!(%errors, "Validation failed, nothing sent to backend");
            self.transition(PipelineState::Failed(
                Stage::Validating,
                FailureReason::Fields(errors.clone()),
            ));
            return Err(LaunchError::Validation(errors));
        }

        self.transition(PipelineState::ApplyingConfig);
        let update_response = match self.api.update_params(&config).await {
            Ok(response) => response,
            Err(cause) => return Err(self.fail_remote(Stage::ApplyingConfig, cause)),
        };
        debug!(response = %update_response, "Parameters applied");

        self.transition(PipelineState::Starting);
        let start_response = match self.api.start(&config).await {
            Ok(response) => response,
            Err(cause) => return Err(self.fail_remote(Stage::Starting, cause)),
        };

        let receipt = LaunchReceipt {
            configuration: config,
            update_response,
            start_response,
            completed_at: Utc::now(),
        };
        self.transition(PipelineState::Succeeded(receipt.clone()));
        info!(symbol = %receipt.configuration.symbol(), "Strategy started");

        Ok(receipt)
    }

    fn fail_remote(&self, stage: Stage, cause: RemoteError) -> LaunchError {
        if stage == Stage::Starting {
            warn!(%cause, "Start failed after parameters were applied on the backend");
        } else {
            warn!(%stage, %cause, "Remote call failed");
        }
        self.transition(PipelineState::Failed(
            stage,
            FailureReason::Remote(cause.clone()),
        ));
        LaunchError::RemoteCallFailed { stage, cause }
    }

    fn transition(&self, next: PipelineState) {
        let mut state = self.lock_state();
        debug!(from = ?StateName(&*state), to = ?StateName(&next), "Pipeline transition");
        *state = next;
    }

    fn lock_state(&self) -> MutexGuard<'_, PipelineState> {
        // The state is a plain report; a poisoned lock still holds a usable value
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Compact state name for logs, without payloads
struct StateName<'a>(&'a PipelineState);

impl fmt::Debug for StateName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            PipelineState::Idle => "Idle",
            PipelineState::Validating => "Validating",
            PipelineState::ApplyingConfig => "ApplyingConfig",
            PipelineState::Starting => "Starting",
            PipelineState::Succeeded(_) => "Succeeded",
            PipelineState::Failed(..) => "Failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_guard_is_exclusive_and_released() {
        let flag = AtomicBool::new(false);

        let guard = InFlightGuard::acquire(&flag).unwrap();
        assert!(InFlightGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_state_helpers() {
        assert_eq!(PipelineState::default(), PipelineState::Idle);

        let failed = PipelineState::Failed(
            Stage::ApplyingConfig,
            FailureReason::Remote(RemoteError::Transport("refused".to_string())),
        );
        assert_eq!(failed.failed_stage(), Some(Stage::ApplyingConfig));
        assert_eq!(PipelineState::Validating.failed_stage(), None);
    }

    #[test]
    fn test_stage_display_names_endpoint() {
        assert_eq!(Stage::Starting.to_string(), "starting (/start)");
        assert_eq!(Stage::Validating.to_string(), "validating");
    }
}
