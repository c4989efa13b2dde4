use std::future::Future;
use std::net::TcpListener;
use std::time::Duration;

use crate::client::{ResourceClient, ResourceClientBuilder};

/// A server under test, launched in-process by [`TestClient`](super::TestClient).
///
/// # Example
///
/// ```rust,no_run
/// use std::net::TcpListener;
///
/// use crudspec_core::test_client::TestServer;
///
/// #[derive(Debug)]
/// struct ProductsApi;
///
/// impl TestServer for ProductsApi {
///     type Error = std::io::Error;
///
///     async fn launch(&self, listener: TcpListener) -> Result<(), Self::Error> {
///         listener.set_nonblocking(true)?;
///         let _listener = tokio::net::TcpListener::from_std(listener)?;
///         // serve the products router here
///         Ok(())
///     }
/// }
/// ```
pub trait TestServer {
    /// Error raised by the server or its health check.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Serves requests on `listener` until the task is aborted.
    fn launch(&self, listener: TcpListener) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Reports whether the server is ready.
    ///
    /// The default only waits for the port to accept connections.
    fn is_healthy(
        &self,
        _client: &ResourceClient,
    ) -> impl Future<Output = Result<HealthStatus, Self::Error>> + Send {
        std::future::ready(Ok(HealthStatus::Uncheckable))
    }

    /// Client and readiness settings.
    fn config(&self) -> TestServerConfig {
        TestServerConfig::default()
    }
}

/// Answer of [`TestServer::is_healthy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Ready to serve requests.
    Healthy,
    /// Not ready yet; the check is retried.
    Unhealthy,
    /// No health endpoint; readiness means accepting a TCP connection.
    Uncheckable,
}

/// Settings used while starting a [`TestServer`].
#[derive(Debug, Clone)]
pub struct TestServerConfig {
    /// Client builder; the port is replaced by the bound port.
    ///
    /// `None` means a default builder configured with [`ResourceClientBuilder::for_products`].
    pub client: Option<ResourceClientBuilder>,
    /// First delay between health checks.
    pub min_backoff_delay: Duration,
    /// Upper bound of the delay between health checks.
    pub max_backoff_delay: Duration,
    /// Randomizes the delays.
    pub backoff_jitter: bool,
    /// Health checks attempted before giving up.
    pub max_retry_attempts: usize,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            client: None,
            min_backoff_delay: Duration::from_millis(10),
            max_backoff_delay: Duration::from_secs(1),
            backoff_jitter: true,
            max_retry_attempts: 10,
        }
    }
}
