//! # crudspec-core
//!
//! Declarative CRUD contract tests for REST resources.
//!
//! A test builds a [`ResourceClient`] for one collection, runs its calls as labelled
//! Given/When/Then steps of a [`Scenario`], keeps the ids it creates in a
//! [`ResourceTracker`] that is always cleaned up, and checks the responses with
//! [`ResponseAssertions`].
//!
//! ## Quick Start
//!
//! The hosted mock below is served over HTTPS, so this needs the `default-tls` or
//! `rustls` feature.
//!
//! ```rust,no_run
//! use crudspec_core::product::NewProduct;
//! use crudspec_core::{ResourceClient, ResourceWorld, ResponseAssertions, Scenario, ScenarioRunner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ResourceClient::builder()
//!     .with_base_url("https://68f81403deff18f212b515ee.mockapi.io")?
//!     .with_base_path("/testesdeapi/products")?
//!     .for_products()
//!     .build()?;
//!
//! let scenario = Scenario::new("delete a product")
//!     .given("an existing product", |world: &mut ResourceWorld| {
//!         Box::pin(async move {
//!             world.create(&NewProduct::unique("Produto", 50.0)).await?.assert_status(201)?;
//!             Ok(())
//!         })
//!     })
//!     .when("deleting it", |world: &mut ResourceWorld| {
//!         Box::pin(async move {
//!             world.delete_current().await?.assert_status(200)?;
//!             Ok(())
//!         })
//!     })
//!     .then("it is gone", |world: &mut ResourceWorld| {
//!         Box::pin(async move {
//!             world.get_current().await?.assert_status(404)?;
//!             Ok(())
//!         })
//!     });
//!
//! let mut world = ResourceWorld::new(client);
//! let result = ScenarioRunner::default().run(scenario, &mut world).await;
//! assert!(result.is_passed(), "{result}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Field paths
//!
//! Assertions locate fields with dotted/bracket paths (`name`, `[0].id`,
//! `items[2].name`), JSON Pointers (`/items/2/name`) or JSONPath (`$.items[2].name`).
//!
//! ## Features
//!
//! - `yaml`: YAML reports for `.yml`/`.yaml` files.
//! - `default-tls`: reqwest's default TLS backend, needed for `https://` deployments.
//! - `rustls`: TLS through rustls instead.
//!
//! Without a TLS feature, only plain `http://` servers (such as a local
//! [`test_client::TestClient`]) can be reached.

mod assertions;
mod client;
mod config;
mod report;
mod scenario;
mod suite;
mod tracker;

pub mod test_client;

#[cfg(feature = "yaml")]
pub mod yaml;

pub use self::assertions::{AssertionFailure, FieldPath, ResponseAssertions};
pub use self::client::product;
pub use self::client::{
    DEFAULT_REQUEST_TIMEOUT, FailureKind, HarnessError, NormalizedResponse, ResourceClient,
    ResourceClientBuilder, UpdateMode,
};
pub use self::config::{
    BASE_PATH_VAR, BASE_URL_VAR, DEFAULT_LATENCY_THRESHOLD, DEFAULT_PERF_ITERATIONS,
    HarnessConfig, MEAN_LATENCY_VAR, PERF_ITERATIONS_VAR, TIMEOUT_VAR,
};
pub use self::report::{ReportFormat, ReportWriter, SuiteReport};
pub use self::scenario::{
    Outcome, ResourceWorld, Scenario, ScenarioFailure, ScenarioResult, ScenarioRunner, Step,
    StepFuture, StepKind, StepRecord, TimingStats, World,
};
pub use self::suite::{ProductCase, ProductSuite};
pub use self::tracker::{CleanupFailure, CleanupReport, ResourceTracker};
