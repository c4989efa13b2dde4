use std::time::Duration;

use serde::{Serialize, Serializer};

use super::TimingStats;
use crate::client::{FailureKind, HarnessError};

/// Outcome of a step or of a whole scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// Ran without error.
    #[display("PASSED")]
    Passed,
    /// Returned an error, or was too slow.
    #[display("FAILED")]
    Failed,
    /// Not invoked because an earlier step failed.
    #[display("SKIPPED")]
    Skipped,
}

/// Record of one executed or skipped step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Kind and label, e.g. `When listing the products`.
    pub label: String,
    /// Wall-clock time of the step, zero when skipped.
    #[serde(rename = "durationMs", serialize_with = "as_millis")]
    pub duration: Duration,
    /// Outcome of the step.
    pub outcome: Outcome,
}

impl StepRecord {
    pub(super) fn new(label: String, duration: Duration, outcome: Outcome) -> Self {
        Self {
            label,
            duration,
            outcome,
        }
    }

    pub(super) fn skipped(label: String) -> Self {
        Self::new(label, Duration::ZERO, Outcome::Skipped)
    }
}

/// Why a scenario failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFailure {
    /// Label of the failing step.
    pub step: String,
    /// Classification of the error.
    pub kind: FailureKind,
    /// Rendered error.
    pub message: String,
}

impl ScenarioFailure {
    pub(super) fn from_error(step: &str, error: &HarnessError) -> Self {
        Self {
            step: step.to_string(),
            kind: error.failure_kind(),
            message: error.to_string(),
        }
    }

    pub(super) fn too_slow(step: &str, mean: Duration, threshold: Duration) -> Self {
        Self {
            step: step.to_string(),
            kind: FailureKind::Assertion,
            message: format!("mean duration {mean:?} exceeds threshold {threshold:?}"),
        }
    }
}

/// Result of a scenario run, serializable as a report entry.
///
/// ```json
/// {"name": "...", "steps": [{"label": "...", "durationMs": 1.2, "outcome": "PASSED"}], "outcome": "PASSED"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
#[display("{name}: {outcome}")]
pub struct ScenarioResult {
    /// Scenario name.
    pub name: String,
    /// Every declared step, skipped ones included.
    pub steps: Vec<StepRecord>,
    /// Overall outcome.
    pub outcome: Outcome,
    /// Set when the outcome is [`Outcome::Failed`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ScenarioFailure>,
    /// Only set by timed scenarios.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingStats>,
}

impl ScenarioResult {
    pub(super) fn new(
        name: String,
        steps: Vec<StepRecord>,
        failure: Option<ScenarioFailure>,
        timing: Option<TimingStats>,
    ) -> Self {
        let outcome = if failure.is_some() {
            Outcome::Failed
        } else {
            Outcome::Passed
        };
        Self {
            name,
            steps,
            outcome,
            failure,
            timing,
        }
    }

    /// Returns `true` when the scenario passed.
    pub fn is_passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    /// Number of steps that were invoked, the failing one included.
    pub fn attempted(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.outcome != Outcome::Skipped)
            .count()
    }

    /// Number of steps never invoked because an earlier step failed.
    pub fn skipped(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.outcome == Outcome::Skipped)
            .count()
    }

    /// Total time spent in steps.
    pub fn duration(&self) -> Duration {
        self.steps.iter().map(|step| step.duration).sum()
    }
}

pub(super) fn as_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    #[allow(clippy::cast_precision_loss)]
    let millis = duration.as_nanos() as f64 / 1_000_000.0;
    serializer.serialize_f64(millis)
}
