//! Given/When/Then scenarios over a mutable world.
//!
//! A [`Scenario`] is an ordered list of labelled [`Step`]s. The [`ScenarioRunner`] invokes
//! them one at a time against a [`World`]; the first failing step makes the scenario
//! [`Outcome::Failed`] and every later step is recorded as skipped without being invoked.
//! The world's [`teardown`](World::teardown) runs afterwards in every case.
//!
//! Step actions borrow the world mutably, so they are written as closures returning a
//! boxed future:
//!
//! ```rust,no_run
//! use crudspec_core::product::NewProduct;
//! use crudspec_core::{ResourceClient, ResourceWorld, ResponseAssertions, Scenario, ScenarioRunner};
//!
//! # async fn example(client: ResourceClient) {
//! let mut world = ResourceWorld::new(client);
//!
//! let scenario = Scenario::new("create a product")
//!     .when("a product is posted", |world: &mut ResourceWorld| {
//!         Box::pin(async move {
//!             world.create(&NewProduct::new("Produto-X", 199.90)).await?;
//!             Ok(())
//!         })
//!     })
//!     .then("it is created", |world: &mut ResourceWorld| {
//!         Box::pin(async move {
//!             world.last_response()?.assert_status(201)?;
//!             Ok(())
//!         })
//!     });
//!
//! let result = ScenarioRunner::default().run(scenario, &mut world).await;
//! assert!(result.is_passed(), "{result:#?}");
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::client::HarnessError;

mod outcome;
pub use self::outcome::{Outcome, ScenarioFailure, ScenarioResult, StepRecord};

mod timing;
pub use self::timing::TimingStats;

mod world;
pub use self::world::ResourceWorld;

/// Future returned by a step action, borrowing the world for `'w`.
pub type StepFuture<'w> = Pin<Box<dyn Future<Output = Result<(), HarnessError>> + Send + 'w>>;

type StepAction<'s, W> = Box<dyn for<'w> FnOnce(&'w mut W) -> StepFuture<'w> + Send + 's>;

/// State shared by the steps of one scenario.
pub trait World: Send {
    /// Runs once after the last step, whether the scenario passed or not.
    fn teardown(&mut self) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }
}

impl World for () {}

/// Given/When/Then/And.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum StepKind {
    /// Sets up the context.
    Given,
    /// Performs the action under test.
    When,
    /// Checks the outcome.
    Then,
    /// Continues the previous kind.
    And,
}

/// A labelled, lazily invoked action.
pub struct Step<'s, W> {
    kind: StepKind,
    label: String,
    action: StepAction<'s, W>,
}

impl<'s, W> Step<'s, W> {
    /// A step of the given kind. The action only runs when the scenario reaches it.
    pub fn new<F>(kind: StepKind, label: impl Into<String>, action: F) -> Self
    where
        F: for<'w> FnOnce(&'w mut W) -> StepFuture<'w> + Send + 's,
    {
        Self {
            kind,
            label: label.into(),
            action: Box::new(action),
        }
    }

    /// Kind of the step.
    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// Label as reported, prefixed by the step kind.
    pub fn label(&self) -> String {
        format!("{} {}", self.kind, self.label)
    }
}

impl<W> std::fmt::Debug for Step<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A named, ordered list of steps.
#[derive(Debug)]
pub struct Scenario<'s, W> {
    name: String,
    steps: Vec<Step<'s, W>>,
}

impl<'s, W> Scenario<'s, W> {
    /// An empty scenario.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Builds a scenario from already declared steps.
    pub fn with_steps(name: impl Into<String>, steps: Vec<Step<'s, W>>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Name used in logs and reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of declared steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` when no step was declared.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Appends a step.
    pub fn step(mut self, step: Step<'s, W>) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends a [`StepKind::Given`] step.
    pub fn given<F>(self, label: impl Into<String>, action: F) -> Self
    where
        F: for<'w> FnOnce(&'w mut W) -> StepFuture<'w> + Send + 's,
    {
        self.step(Step::new(StepKind::Given, label, action))
    }

    /// Appends a [`StepKind::When`] step.
    pub fn when<F>(self, label: impl Into<String>, action: F) -> Self
    where
        F: for<'w> FnOnce(&'w mut W) -> StepFuture<'w> + Send + 's,
    {
        self.step(Step::new(StepKind::When, label, action))
    }

    /// Appends a [`StepKind::Then`] step.
    pub fn then<F>(self, label: impl Into<String>, action: F) -> Self
    where
        F: for<'w> FnOnce(&'w mut W) -> StepFuture<'w> + Send + 's,
    {
        self.step(Step::new(StepKind::Then, label, action))
    }

    /// Appends a [`StepKind::And`] step.
    pub fn and<F>(self, label: impl Into<String>, action: F) -> Self
    where
        F: for<'w> FnOnce(&'w mut W) -> StepFuture<'w> + Send + 's,
    {
        self.step(Step::new(StepKind::And, label, action))
    }
}

/// Executes scenarios.
///
/// Steps run strictly in order on the calling task; one step is in flight at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioRunner;

impl ScenarioRunner {
    /// Runs `steps` as the scenario `name`.
    pub async fn run_steps<W>(
        &self,
        name: impl Into<String>,
        steps: Vec<Step<'_, W>>,
        world: &mut W,
    ) -> ScenarioResult
    where
        W: World,
    {
        self.run(Scenario::with_steps(name, steps), world).await
    }

    /// Runs every step of `scenario`, then the world's teardown.
    pub async fn run<W>(&self, scenario: Scenario<'_, W>, world: &mut W) -> ScenarioResult
    where
        W: World,
    {
        let Scenario { name, steps } = scenario;
        let span = info_span!("scenario", %name);

        async move {
            let mut records = Vec::with_capacity(steps.len());
            let mut failure = None;

            for step in steps {
                let label = step.label();
                if failure.is_some() {
                    debug!(%label, "step skipped");
                    records.push(StepRecord::skipped(label));
                    continue;
                }

                let start = Instant::now();
                let result = (step.action)(&mut *world).await;
                let duration = start.elapsed();

                match result {
                    Ok(()) => {
                        info!(%label, ?duration, "step passed");
                        records.push(StepRecord::new(label, duration, Outcome::Passed));
                    }
                    Err(err) => {
                        error!(%label, error = %err, "step failed");
                        failure = Some(ScenarioFailure::from_error(&label, &err));
                        records.push(StepRecord::new(label, duration, Outcome::Failed));
                    }
                }
            }

            world.teardown().await;

            let result = ScenarioResult::new(name, records, failure, None);
            info!(outcome = %result.outcome, "scenario finished");
            result
        }
        .instrument(span)
        .await
    }

    /// Repeats `action` `iterations` times and checks the mean duration.
    ///
    /// Each iteration is recorded as a `When {label} #n` step. The scenario fails on the
    /// first failing iteration, or when the mean over all iterations exceeds `threshold`;
    /// the timing statistics are attached in both the passed and the slow case.
    pub async fn measure<W, F>(
        &self,
        name: impl Into<String>,
        label: &str,
        iterations: usize,
        threshold: Duration,
        mut action: F,
        world: &mut W,
    ) -> ScenarioResult
    where
        W: World,
        F: for<'w> FnMut(&'w mut W) -> StepFuture<'w> + Send,
    {
        let name = name.into();
        let span = info_span!("scenario", %name, iterations, ?threshold);

        async move {
            let mut records = Vec::with_capacity(iterations);
            let mut durations = Vec::with_capacity(iterations);
            let mut failure = None;

            for iteration in 1..=iterations {
                let step_label = format!("{} {label} #{iteration}", StepKind::When);
                if failure.is_some() {
                    records.push(StepRecord::skipped(step_label));
                    continue;
                }

                let start = Instant::now();
                let result = action(&mut *world).await;
                let duration = start.elapsed();

                match result {
                    Ok(()) => {
                        debug!(%step_label, ?duration, "iteration passed");
                        durations.push(duration);
                        records.push(StepRecord::new(step_label, duration, Outcome::Passed));
                    }
                    Err(err) => {
                        error!(%step_label, error = %err, "iteration failed");
                        failure = Some(ScenarioFailure::from_error(&step_label, &err));
                        records.push(StepRecord::new(step_label, duration, Outcome::Failed));
                    }
                }
            }

            world.teardown().await;

            let timing = TimingStats::from_durations(&durations);
            if failure.is_none()
                && let Some(stats) = &timing
                && !stats.mean_within(threshold)
            {
                warn!(mean = ?stats.mean, ?threshold, "mean duration above threshold");
                failure = Some(ScenarioFailure::too_slow(label, stats.mean, threshold));
            }

            let result = ScenarioResult::new(name, records, failure, timing);
            info!(outcome = %result.outcome, timing = ?result.timing, "scenario finished");
            result
        }
        .instrument(span)
        .await
    }
}
