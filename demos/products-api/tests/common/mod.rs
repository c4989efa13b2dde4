use rstest::fixture;
use tracing_subscriber::EnvFilter;

mod test_app;
pub use self::test_app::*;

/// Installs a test-writer subscriber; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            "crudspec_core=debug,products_api=debug,tower_http=info",
        ))
        .with_test_writer()
        .try_init();
}

/// A products API on a random port, seeded with the bundled catalogue.
#[fixture]
pub async fn app() -> TestApp {
    init_tracing();
    TestApp::start()
        .await
        .unwrap_or_else(|error| panic!("products API did not start: {error}"))
}
