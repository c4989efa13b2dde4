//! Harness configuration from the environment.

use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::client::{DEFAULT_REQUEST_TIMEOUT, HarnessError, ResourceClient, ResourceClientBuilder};

/// Base URL of the deployment, e.g. `https://api.example.com`.
pub const BASE_URL_VAR: &str = "CRUDSPEC_BASE_URL";
/// Path of the collection under test, e.g. `/products`.
pub const BASE_PATH_VAR: &str = "CRUDSPEC_BASE_PATH";
/// Per-request timeout, in milliseconds.
pub const TIMEOUT_VAR: &str = "CRUDSPEC_TIMEOUT_MS";
/// Mean latency threshold of the performance scenario, in milliseconds.
pub const MEAN_LATENCY_VAR: &str = "CRUDSPEC_MEAN_LATENCY_MS";
/// Request count of the performance scenario.
pub const PERF_ITERATIONS_VAR: &str = "CRUDSPEC_PERF_ITERATIONS";

/// Default mean latency threshold of the performance scenario.
pub const DEFAULT_LATENCY_THRESHOLD: Duration = Duration::from_millis(10);

/// Default number of requests of the performance scenario.
pub const DEFAULT_PERF_ITERATIONS: usize = 15;

/// Where the resource under test lives and how strict the checks are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Scheme, host and optional port.
    pub base_url: String,
    /// Collection path appended to the base URL.
    pub base_path: String,
    /// Timeout of each request.
    pub request_timeout: Duration,
    /// Maximum mean duration accepted by the latency case.
    pub latency_threshold: Duration,
    /// Number of requests sent by the latency case.
    pub perf_iterations: usize,
}

impl HarnessConfig {
    /// Configuration with default timeout and performance settings.
    pub fn new(base_url: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            base_path: base_path.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            latency_threshold: DEFAULT_LATENCY_THRESHOLD,
            perf_iterations: DEFAULT_PERF_ITERATIONS,
        }
    }

    /// Reads the `CRUDSPEC_*` environment variables.
    ///
    /// # Errors
    ///
    /// [`HarnessError::MissingConfig`] when the base URL or path is unset,
    /// [`HarnessError::InvalidConfig`] when a numeric entry does not parse.
    pub fn from_env() -> Result<Self, HarnessError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarnessError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(HarnessError::MissingConfig { key })
        };

        let mut config = Self::new(required(BASE_URL_VAR)?, required(BASE_PATH_VAR)?);
        if let Some(millis) = parse_optional::<u64>(&lookup, TIMEOUT_VAR)? {
            config.request_timeout = Duration::from_millis(millis);
        }
        if let Some(millis) = parse_optional::<u64>(&lookup, MEAN_LATENCY_VAR)? {
            config.latency_threshold = Duration::from_millis(millis);
        }
        if let Some(iterations) = parse_optional::<usize>(&lookup, PERF_ITERATIONS_VAR)? {
            config.perf_iterations = iterations;
        }

        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// A client builder for the product resource at the configured location.
    ///
    /// # Errors
    ///
    /// Fails on an invalid base URL or path.
    pub fn client_builder(&self) -> Result<ResourceClientBuilder, HarnessError> {
        let builder = ResourceClient::builder()
            .with_base_url(&self.base_url)?
            .with_base_path(self.base_path.as_str())?
            .with_timeout(self.request_timeout)
            .for_products();
        Ok(builder)
    }

    /// Builds the product client.
    ///
    /// # Errors
    ///
    /// See [`client_builder`](Self::client_builder).
    pub fn client(&self) -> Result<ResourceClient, HarnessError> {
        self.client_builder()?.build()
    }
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, HarnessError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|err: T::Err| HarnessError::InvalidConfig {
            key,
            value,
            error: err.to_string(),
        })
}
