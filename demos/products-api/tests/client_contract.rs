#![allow(missing_docs, clippy::expect_used)]
use rstest::rstest;
use serde_json::json;

use crudspec_core::product::{NewProduct, Product, ProductPatch};
use crudspec_core::{FailureKind, HarnessError, ResponseAssertions};

mod common;
use self::common::*;

#[rstest]
#[tokio::test]
async fn should_list_seeded_products(#[future] app: TestApp) {
    let app = app.await;

    let response = app.list().await.expect("list");

    response
        .assert_status(200)
        .and_then(|it| it.assert_non_empty_list())
        .and_then(|it| it.assert_field_present_in_each_element("id"))
        .and_then(|it| it.assert_field_present_in_each_element("createdAt"))
        .expect("a list of products");
    assert!(response.is_json());
    let products = response.json::<Vec<Product>>().expect("products");
    assert_eq!(products.len(), 4);
}

#[rstest]
#[tokio::test]
async fn should_run_crud_lifecycle(#[future] app: TestApp) {
    let app = app.await;
    let product = NewProduct::unique("Produto", 199.90).with_category("Categoria Teste");

    let created = app.create(&product).await.expect("create");
    created
        .assert_status(201)
        .and_then(|it| it.assert_field_equals("name", product.name.as_str()))
        .and_then(|it| it.assert_field_matches("createdAt", r"^\d{4}-\d{2}-\d{2}T"))
        .expect("created product");
    let id = created.id().expect("created id");

    let fetched = app.get_by_id(&id).await.expect("get");
    fetched
        .assert_status(200)
        .and_then(|it| it.assert_field_equals("/id", id.as_str()))
        .and_then(|it| it.assert_field_equals("$.price", 199.9))
        .and_then(|it| it.assert_field_equals("name", product.name.as_str()))
        .and_then(|it| it.assert_field_equals("category", "Categoria Teste"))
        .expect("fetched product");

    let replaced = app
        .replace(&id, &NewProduct::new("Produto-Novo", 10.0))
        .await
        .expect("replace");
    replaced
        .assert_status(200)
        .and_then(|it| it.assert_field_equals("name", "Produto-Novo"))
        .expect("replaced product");

    let patch = ProductPatch {
        description: Some("Descrição".to_string()),
        ..ProductPatch::default()
    };
    let patched = app.patch(&id, &patch).await.expect("patch");
    patched
        .assert_status(200)
        .and_then(|it| it.assert_field_equals("description", "Descrição"))
        .and_then(|it| it.assert_field_equals("name", "Produto-Novo"))
        .expect("patched product");

    app.delete(&id)
        .await
        .expect("delete")
        .assert_status(200)
        .expect("deleted");
    app.get_by_id(&id)
        .await
        .expect("get after delete")
        .assert_status(404)
        .expect("gone");
}

#[rstest]
#[tokio::test]
async fn should_read_back_every_replaced_field(#[future] app: TestApp) {
    let app = app.await;
    let original = NewProduct::unique("Produto", 100.0)
        .with_category("Categoria Original")
        .with_description("Descrição original");
    let id = app
        .create(&original)
        .await
        .expect("create")
        .id()
        .expect("created id");
    let created_at = app
        .get_by_id(&id)
        .await
        .expect("get")
        .json::<Product>()
        .expect("product")
        .created_at;

    let replacement =
        NewProduct::new("Produto-Atualizado", 250.0).with_category("Categoria Atualizada");
    app.replace(&id, &replacement)
        .await
        .expect("replace")
        .assert_status(200)
        .expect("replaced");
    let stored = app
        .get_by_id(&id)
        .await
        .expect("get after replace")
        .json::<Product>()
        .expect("product");

    assert_eq!(stored.id, id);
    assert_eq!(stored.name, "Produto-Atualizado");
    assert_eq!(stored.category.as_deref(), Some("Categoria Atualizada"));
    assert!((stored.price - 250.0).abs() < f64::EPSILON);
    assert_eq!(stored.description, None);
    assert_eq!(stored.created_at, created_at);
}

#[rstest]
#[tokio::test]
async fn should_read_back_only_patched_fields(#[future] app: TestApp) {
    let app = app.await;
    let original = NewProduct::unique("Produto", 100.0)
        .with_category("Categoria Original")
        .with_description("Descrição original");
    let id = app
        .create(&original)
        .await
        .expect("create")
        .id()
        .expect("created id");

    let patch = ProductPatch {
        price: Some(75.5),
        ..ProductPatch::default()
    };
    app.patch(&id, &patch)
        .await
        .expect("patch")
        .assert_status(200)
        .expect("patched");
    let fetched = app.get_by_id(&id).await.expect("get after patch");

    fetched
        .assert_field_equals("price", 75.5)
        .and_then(|it| it.assert_field_equals("name", original.name.as_str()))
        .and_then(|it| it.assert_field_equals("category", "Categoria Original"))
        .and_then(|it| it.assert_field_equals("description", "Descrição original"))
        .expect("untouched fields kept");
}

#[rstest]
#[tokio::test]
async fn should_answer_404_on_second_delete(#[future] app: TestApp) {
    let app = app.await;
    let created = app
        .create(&NewProduct::unique("Produto", 50.0))
        .await
        .expect("create");
    let id = created.id().expect("created id");

    app.delete(&id).await.expect("first delete");
    let second = app.delete(&id).await.expect("second delete");

    assert_eq!(second.status_code(), 404);
    assert_eq!(second.body(), Some(&json!("Not found")));
}

#[rstest]
#[case::unknown("999999")]
#[case::not_a_number("not-a-number")]
#[tokio::test]
async fn should_answer_404_for_unknown_id(#[future] app: TestApp, #[case] id: &str) {
    let app = app.await;

    let response = app.get_by_id(id).await.expect("get");

    assert_eq!(response.status_code(), 404);
}

#[rstest]
#[tokio::test]
async fn should_reject_payload_before_sending(#[future] app: TestApp) {
    let app = app.await;

    let missing = app.create(&json!({ "name": "Produto" })).await;
    let server_field = app
        .create(&json!({ "name": "Produto", "price": 1.0, "id": "7" }))
        .await;
    let blank_id = app.delete("  ").await;

    assert!(matches!(missing, Err(HarnessError::MissingField { .. })));
    assert!(matches!(server_field, Err(HarnessError::ServerOnlyField { .. })));
    assert!(matches!(blank_id, Err(HarnessError::EmptyId { .. })));
    let kinds =
        [missing, server_field, blank_id].map(|it| it.err().map(|err| err.failure_kind()));
    assert!(kinds.iter().all(|kind| *kind == Some(FailureKind::Caller)));
    let products = app
        .list()
        .await
        .expect("list")
        .json::<Vec<Product>>()
        .expect("products");
    assert_eq!(products.len(), 4);
}

#[rstest]
#[tokio::test]
async fn should_report_assertion_mismatch(#[future] app: TestApp) {
    let app = app.await;

    let response = app.get_by_id("1").await.expect("get");
    let failure = response
        .assert_field_equals("price", -1)
        .map(|_| ())
        .map_err(HarnessError::from)
        .expect_err("price differs");

    assert_eq!(failure.failure_kind(), FailureKind::Assertion);
    insta::assert_snapshot!(failure.to_string(), @"assert_field_equals failed: expected price == -1, got 7499.9");
}
