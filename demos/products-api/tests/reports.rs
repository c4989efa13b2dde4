#![allow(missing_docs, clippy::expect_used)]
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use rstest::rstest;
use serde_json::Value;

use crudspec_core::{ProductCase, ProductSuite, ReportFormat, ReportWriter};

mod common;
use self::common::*;

fn report_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("products-api-{name}-{}", std::process::id()))
}

#[rstest]
#[tokio::test]
async fn should_write_one_report_per_scenario(#[future] app: TestApp) {
    let app = app.await;
    let dir = report_dir("per-scenario");
    let suite = ProductSuite::new(app.client().clone());
    let result = suite.run(ProductCase::Create).await;

    let path = ReportWriter::new(&dir).write(&result).expect("report written");

    assert_eq!(path, dir.join("ct-03-create-product.json"));
    let report: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("readable")).expect("json");
    assert_eq!(report["name"], "CT-03 create product");
    assert_eq!(report["outcome"], "PASSED");
    let labels = report["steps"]
        .as_array()
        .expect("steps")
        .iter()
        .map(|step| step["label"].as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    insta::assert_debug_snapshot!(labels, @r#"
    [
        "When creating a product",
        "Then the status is 201",
        "And the body echoes the product",
    ]
    "#);

    fs::remove_dir_all(&dir).expect("cleanup");
}

#[rstest]
#[tokio::test]
async fn should_write_yaml_suite_report(#[future] app: TestApp) {
    let app = app.await;
    let dir = report_dir("suite");
    let suite = ProductSuite::new(app.client().clone())
        .with_latency_threshold(Duration::from_secs(1))
        .with_perf_iterations(2);
    let results = vec![
        suite.run(ProductCase::List).await,
        suite.run(ProductCase::MeanLatency).await,
    ];
    let path = dir.join("suite.yml");

    ReportWriter::write_suite(&path, &results).expect("report written");

    assert_eq!(ReportFormat::from_path(&path), ReportFormat::Yaml);
    let contents = fs::read_to_string(&path).expect("readable");
    assert!(contents.contains("passed: 2"), "{contents}");
    assert!(contents.contains("failed: 0"), "{contents}");
    assert!(contents.contains("CT-06 mean response time"), "{contents}");
    assert!(contents.contains("meanMs"), "{contents}");

    fs::remove_dir_all(&dir).expect("cleanup");
}
