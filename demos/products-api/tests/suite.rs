#![allow(missing_docs, clippy::expect_used)]
use std::time::Duration;

use rstest::rstest;

use crudspec_core::{Outcome, ProductCase, ProductSuite};

mod common;
use self::common::*;

#[rstest]
#[case::list(ProductCase::List)]
#[case::get_by_id(ProductCase::GetById)]
#[case::create(ProductCase::Create)]
#[case::replace(ProductCase::Replace)]
#[case::patch(ProductCase::Patch)]
#[case::delete(ProductCase::Delete)]
#[case::mean_latency(ProductCase::MeanLatency)]
#[tokio::test]
async fn should_pass_product_case(#[future] app: TestApp, #[case] case: ProductCase) {
    let app = app.await;
    // debug builds on shared runners are slow; the default threshold targets deployments
    let suite =
        ProductSuite::new(app.client().clone()).with_latency_threshold(Duration::from_secs(1));

    let result = suite.run(case).await;

    assert!(result.is_passed(), "{result}: {:?}", result.failure);
    assert_eq!(result.outcome, Outcome::Passed);
    assert_eq!(result.skipped(), 0);
}

#[rstest]
#[tokio::test]
async fn should_leave_no_product_behind(#[future] app: TestApp) {
    let app = app.await;
    let before = app.list().await.expect("list").body().cloned();
    let suite = ProductSuite::new(app.client().clone())
        .with_latency_threshold(Duration::from_secs(1))
        .with_perf_iterations(3);

    let results = suite.run_all().await;

    assert_eq!(results.len(), ProductCase::ALL.len());
    assert!(results.iter().all(|result| result.is_passed()));
    let after = app.list().await.expect("list").body().cloned();
    assert_eq!(after, before);
}

#[rstest]
#[tokio::test]
async fn should_fail_latency_case_with_zero_threshold(#[future] app: TestApp) {
    let app = app.await;
    let suite = ProductSuite::new(app.client().clone())
        .with_latency_threshold(Duration::ZERO)
        .with_perf_iterations(3);

    let result = suite.run(ProductCase::MeanLatency).await;

    assert_eq!(result.outcome, Outcome::Failed);
    let timing = result.timing.expect("timing recorded");
    assert_eq!(timing.count, 3);
    assert!(result.failure.is_some());
}
