#![allow(
    clippy::missing_errors_doc,
    dead_code,
    missing_docs,
    clippy::expect_used
)]
use std::io;
use std::net::TcpListener;

use tracing::{debug, info};

use crudspec_core::ResourceClient;
use crudspec_core::test_client::{
    HealthStatus, TestAppError, TestClient, TestServer, TestServerConfig,
};

use products_api::{PRODUCTS_PATH, launch};

#[derive(Debug)]
pub struct AppTestServer;

impl TestServer for AppTestServer {
    type Error = io::Error;

    async fn launch(&self, listener: TcpListener) -> Result<(), Self::Error> {
        listener.set_nonblocking(true)?;
        let listener = tokio::net::TcpListener::from_std(listener)?;
        info!(?listener, "launching server");
        launch(listener).await.map_err(io::Error::other)
    }

    async fn is_healthy(&self, client: &ResourceClient) -> Result<HealthStatus, Self::Error> {
        match client.list().await {
            Ok(response) if response.is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => {
                debug!(status = %response.status(), "products not ready");
                Ok(HealthStatus::Unhealthy)
            }
            Err(error) => {
                debug!(%error, "products not reachable");
                Ok(HealthStatus::Unhealthy)
            }
        }
    }

    fn config(&self) -> TestServerConfig {
        let client = ResourceClient::builder()
            .with_base_path(PRODUCTS_PATH)
            .expect("valid base path")
            .for_products();

        TestServerConfig {
            client: Some(client),
            ..Default::default()
        }
    }
}

#[derive(Debug, derive_more::Deref)]
pub struct TestApp(TestClient<AppTestServer>);

impl TestApp {
    pub async fn start() -> Result<Self, TestAppError> {
        let client = TestClient::start(AppTestServer).await?;
        Ok(Self(client))
    }
}
