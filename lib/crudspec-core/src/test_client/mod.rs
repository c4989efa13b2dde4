//! In-process server launcher for integration tests.
//!
//! [`TestClient::start`] binds a random local port, spawns the [`TestServer`] on it, waits
//! until it is healthy, and dereferences to a [`ResourceClient`] pointing at that port.
//! The server task is aborted when the client is dropped.
//!
//! ```rust,no_run
//! use std::net::TcpListener;
//!
//! use crudspec_core::test_client::{TestClient, TestServer};
//! use crudspec_core::ResponseAssertions;
//!
//! #[derive(Debug)]
//! struct ProductsApi;
//!
//! impl TestServer for ProductsApi {
//!     type Error = std::io::Error;
//!
//!     async fn launch(&self, listener: TcpListener) -> Result<(), Self::Error> {
//!         listener.set_nonblocking(true)?;
//!         let _listener = tokio::net::TcpListener::from_std(listener)?;
//!         // serve the products router here
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TestClient::start(ProductsApi).await?;
//! client.list().await?.assert_status(200)?;
//! # Ok(())
//! # }
//! ```

use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Instant;

use backon::{ExponentialBuilder, Retryable};
use tracing::{debug, error};

use crate::client::ResourceClient;
use crate::scenario::ResourceWorld;

mod error;
pub use self::error::TestAppError;

mod test_server;
pub use self::test_server::{HealthStatus, TestServer, TestServerConfig};

/// A [`ResourceClient`] bound to a server running in the background.
#[derive(Debug, derive_more::Deref)]
pub struct TestClient<T> {
    local_addr: SocketAddr,
    #[deref]
    client: ResourceClient,
    handle: Option<tokio::task::JoinHandle<()>>,
    #[allow(dead_code)]
    test_server: Arc<T>,
}

impl<T> TestClient<T>
where
    T: TestServer + Send + Sync + 'static,
{
    /// Launches `test_server` and waits until it is healthy.
    ///
    /// # Errors
    ///
    /// Fails if the port cannot be bound, the client cannot be built, or the server does
    /// not become healthy within the configured retries.
    pub async fn start(test_server: T) -> Result<Self, TestAppError> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;

        let test_server = Arc::new(test_server);
        let handle = tokio::spawn({
            let server = Arc::clone(&test_server);
            async move {
                if let Err(error) = server.launch(listener).await {
                    error!(%error, "server launch failed");
                }
            }
        });

        let TestServerConfig {
            client,
            min_backoff_delay,
            max_backoff_delay,
            backoff_jitter,
            max_retry_attempts,
        } = test_server.config();

        let client = client.unwrap_or_else(|| ResourceClient::builder().for_products());
        let client = client.with_port(local_addr.port()).build()?;

        let mut backoff = ExponentialBuilder::default()
            .with_min_delay(min_backoff_delay)
            .with_max_delay(max_backoff_delay)
            .with_max_times(max_retry_attempts);
        if backoff_jitter {
            backoff = backoff.with_jitter();
        }

        let waiting_since = Instant::now();
        let healthy = Self::wait_for_health(&test_server, &client, local_addr, backoff).await;
        if !healthy {
            handle.abort();
            return Err(TestAppError::UnhealthyServer {
                elapsed: waiting_since.elapsed(),
            });
        }

        Ok(Self {
            local_addr,
            client,
            handle: Some(handle),
            test_server,
        })
    }

    async fn wait_for_health(
        test_server: &Arc<T>,
        client: &ResourceClient,
        local_addr: SocketAddr,
        backoff: ExponentialBuilder,
    ) -> bool {
        let health_check = || async {
            match test_server.is_healthy(client).await {
                Ok(HealthStatus::Healthy) => {
                    debug!("server healthy");
                    Ok(true)
                }
                Ok(HealthStatus::Unhealthy) => {
                    debug!("server not yet healthy, retrying");
                    Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "server not healthy yet",
                    ))
                }
                Ok(HealthStatus::Uncheckable) => {
                    debug!("waiting for a connection to the server");
                    tokio::net::TcpStream::connect(local_addr).await?;
                    Ok(true)
                }
                Err(error) => {
                    error!(%error, "health check error");
                    Ok(false)
                }
            }
        };

        health_check.retry(backoff).await.unwrap_or(false)
    }
}

impl<T> TestClient<T> {
    /// Address the server listens on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The client bound to the server.
    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    /// A fresh scenario world using this client.
    pub fn world(&self) -> ResourceWorld {
        ResourceWorld::new(self.client.clone())
    }
}

impl<T> Drop for TestClient<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
