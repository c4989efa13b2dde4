use std::time::Duration;

use crate::client::HarnessError;

/// Errors raised while starting a [`TestClient`](super::TestClient).
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TestAppError {
    /// Binding the listener failed.
    IoError(std::io::Error),

    /// The client could not be built.
    ClientError(HarnessError),

    /// The server never reported healthy.
    #[display("unhealthy server after {elapsed:?}")]
    #[from(skip)]
    UnhealthyServer {
        /// Time spent waiting for the server, all health checks included.
        elapsed: Duration,
    },
}
