//! The standard product contract suite.
//!
//! Each [`ProductCase`] is one scenario run against a fresh [`ResourceWorld`], so every
//! case cleans up after itself.

use std::time::Duration;

use crate::assertions::ResponseAssertions;
use crate::client::ResourceClient;
use crate::client::product::{NewProduct, ProductPatch};
use crate::config::{DEFAULT_LATENCY_THRESHOLD, DEFAULT_PERF_ITERATIONS, HarnessConfig};
use crate::scenario::{ResourceWorld, Scenario, ScenarioResult, ScenarioRunner};

const CREATED_CATEGORY: &str = "Categoria Teste";
const CREATED_PRICE: f64 = 199.90;

/// One case of the product suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ProductCase {
    /// CT-01: the list is non-empty and every product has an id and a name.
    #[display("CT-01 list products")]
    List,
    /// CT-02: a created product can be read back by id.
    #[display("CT-02 get product by id")]
    GetById,
    /// CT-03: a product is created with the posted fields.
    #[display("CT-03 create product")]
    Create,
    /// CT-04: `PUT` replaces the mutable fields.
    #[display("CT-04 replace product")]
    Replace,
    /// `PATCH` changes only the given fields.
    #[display("CT-04b patch product")]
    Patch,
    /// CT-05: a deleted product is gone.
    #[display("CT-05 delete product")]
    Delete,
    /// CT-06: the mean latency of repeated list calls stays under the threshold.
    #[display("CT-06 mean response time")]
    MeanLatency,
}

impl ProductCase {
    /// Every case, in suite order.
    pub const ALL: [Self; 7] = [
        Self::List,
        Self::GetById,
        Self::Create,
        Self::Replace,
        Self::Patch,
        Self::Delete,
        Self::MeanLatency,
    ];
}

/// Runs [`ProductCase`]s against one product collection.
#[derive(Debug, Clone)]
pub struct ProductSuite {
    client: ResourceClient,
    latency_threshold: Duration,
    perf_iterations: usize,
    runner: ScenarioRunner,
}

impl ProductSuite {
    /// Suite with the default latency threshold and iteration count.
    pub fn new(client: ResourceClient) -> Self {
        Self {
            client,
            latency_threshold: DEFAULT_LATENCY_THRESHOLD,
            perf_iterations: DEFAULT_PERF_ITERATIONS,
            runner: ScenarioRunner,
        }
    }

    /// Builds the suite from a configuration.
    ///
    /// # Errors
    ///
    /// Fails when the client cannot be built.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, crate::HarnessError> {
        let suite = Self::new(config.client()?)
            .with_latency_threshold(config.latency_threshold)
            .with_perf_iterations(config.perf_iterations);
        Ok(suite)
    }

    /// Maximum mean duration accepted by [`ProductCase::MeanLatency`].
    pub fn with_latency_threshold(mut self, threshold: Duration) -> Self {
        self.latency_threshold = threshold;
        self
    }

    /// Number of requests sent by [`ProductCase::MeanLatency`].
    pub fn with_perf_iterations(mut self, iterations: usize) -> Self {
        self.perf_iterations = iterations;
        self
    }

    /// Runs every case in order.
    pub async fn run_all(&self) -> Vec<ScenarioResult> {
        let mut results = Vec::with_capacity(ProductCase::ALL.len());
        for case in ProductCase::ALL {
            results.push(self.run(case).await);
        }
        results
    }

    /// Runs one case with a fresh world.
    pub async fn run(&self, case: ProductCase) -> ScenarioResult {
        let mut world = ResourceWorld::new(self.client.clone());
        let name = case.to_string();

        match case {
            ProductCase::List => self.runner.run(list_scenario(name), &mut world).await,
            ProductCase::GetById => self.runner.run(get_by_id_scenario(name), &mut world).await,
            ProductCase::Create => self.runner.run(create_scenario(name), &mut world).await,
            ProductCase::Replace => self.runner.run(replace_scenario(name), &mut world).await,
            ProductCase::Patch => self.runner.run(patch_scenario(name), &mut world).await,
            ProductCase::Delete => self.runner.run(delete_scenario(name), &mut world).await,
            ProductCase::MeanLatency => {
                self.runner
                    .measure(
                        name,
                        "listing products",
                        self.perf_iterations,
                        self.latency_threshold,
                        |world: &mut ResourceWorld| {
                            Box::pin(async move {
                                world.list().await?.assert_status_in(200..=299)?;
                                Ok(())
                            })
                        },
                        &mut world,
                    )
                    .await
            }
        }
    }
}

fn list_scenario(name: String) -> Scenario<'static, ResourceWorld> {
    Scenario::new(name)
        .when("listing products", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.list().await?;
                Ok(())
            })
        })
        .then("the status is 200", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.last_response()?.assert_status(200)?;
                Ok(())
            })
        })
        .and("the list is not empty", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.last_response()?.assert_non_empty_list()?;
                Ok(())
            })
        })
        .and("every product has an id and a name", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world
                    .last_response()?
                    .assert_field_present_in_each_element("id")?
                    .assert_field_present_in_each_element("name")?;
                Ok(())
            })
        })
}

fn get_by_id_scenario(name: String) -> Scenario<'static, ResourceWorld> {
    let product = NewProduct::unique("Produto", CREATED_PRICE).with_category(CREATED_CATEGORY);

    Scenario::new(name)
        .given("an existing product", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.create(&product).await?.assert_status(201)?;
                Ok(())
            })
        })
        .when("reading it by id", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.get_current().await?;
                Ok(())
            })
        })
        .then("the status is 200", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.last_response()?.assert_status(200)?;
                Ok(())
            })
        })
        .and("the product is complete", |world: &mut ResourceWorld| {
            Box::pin(async move {
                let id = world.current_id()?.to_string();
                world
                    .last_response()?
                    .assert_field_equals("id", id)?
                    .assert_field_present("name")?
                    .assert_field_equals("category", CREATED_CATEGORY)?
                    .assert_field_equals("price", CREATED_PRICE)?
                    .assert_field_present("createdAt")?;
                Ok(())
            })
        })
}

fn create_scenario(name: String) -> Scenario<'static, ResourceWorld> {
    let product = NewProduct::unique("Produto", CREATED_PRICE).with_category(CREATED_CATEGORY);
    let expected = product.clone();

    Scenario::new(name)
        .when("creating a product", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.create(&product).await?;
                Ok(())
            })
        })
        .then("the status is 201", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.last_response()?.assert_status(201)?;
                Ok(())
            })
        })
        .and("the body echoes the product", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world
                    .last_response()?
                    .assert_field_equals("name", expected.name)?
                    .assert_field_equals("category", CREATED_CATEGORY)?
                    .assert_field_equals("price", expected.price)?
                    .assert_field_present("id")?;
                Ok(())
            })
        })
}

fn replace_scenario(name: String) -> Scenario<'static, ResourceWorld> {
    let original = NewProduct::unique("Produto", 100.0).with_category("Categoria Original");
    let updated = NewProduct::new(format!("{}-Atualizado", original.name), 250.0)
        .with_category("Categoria Atualizada");
    let expected = updated.clone();
    let stored = updated.clone();

    Scenario::new(name)
        .given("an existing product", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.create(&original).await?.assert_status(201)?;
                Ok(())
            })
        })
        .when("replacing it", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.replace_current(&updated).await?;
                Ok(())
            })
        })
        .then("the status is 200", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.last_response()?.assert_status(200)?;
                Ok(())
            })
        })
        .and("the body holds the new fields", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world
                    .last_response()?
                    .assert_field_equals("name", expected.name)?
                    .assert_field_equals("category", "Categoria Atualizada")?
                    .assert_field_equals("price", expected.price)?;
                Ok(())
            })
        })
        .and("reading it back shows the new fields", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world
                    .get_current()
                    .await?
                    .assert_status(200)?
                    .assert_field_equals("name", stored.name)?
                    .assert_field_equals("category", "Categoria Atualizada")?
                    .assert_field_equals("price", stored.price)?;
                Ok(())
            })
        })
}

fn patch_scenario(name: String) -> Scenario<'static, ResourceWorld> {
    let original = NewProduct::unique("Produto", 100.0).with_category("Categoria Original");
    let original_name = original.name.clone();
    let stored_name = original.name.clone();
    let patch = ProductPatch {
        price: Some(75.5),
        ..ProductPatch::default()
    };

    Scenario::new(name)
        .given("an existing product", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.create(&original).await?.assert_status(201)?;
                Ok(())
            })
        })
        .when("patching its price", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.patch_current(&patch).await?;
                Ok(())
            })
        })
        .then("the status is 200", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.last_response()?.assert_status(200)?;
                Ok(())
            })
        })
        .and("only the price changed", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world
                    .last_response()?
                    .assert_field_equals("price", 75.5)?
                    .assert_field_equals("name", original_name)?
                    .assert_field_equals("category", "Categoria Original")?;
                Ok(())
            })
        })
        .and("reading it back shows only the new price", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world
                    .get_current()
                    .await?
                    .assert_status(200)?
                    .assert_field_equals("price", 75.5)?
                    .assert_field_equals("name", stored_name)?
                    .assert_field_equals("category", "Categoria Original")?;
                Ok(())
            })
        })
}

fn delete_scenario(name: String) -> Scenario<'static, ResourceWorld> {
    let product = NewProduct::unique("Produto", 50.0).with_category("Categoria Delete");

    Scenario::new(name)
        .given("an existing product", move |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.create(&product).await?.assert_status(201)?;
                Ok(())
            })
        })
        .when("deleting it", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.delete_current().await?.assert_status(200)?;
                Ok(())
            })
        })
        .then("reading it again", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.get_current().await?;
                Ok(())
            })
        })
        .and("the status is 404", |world: &mut ResourceWorld| {
            Box::pin(async move {
                world.last_response()?.assert_status(404)?;
                Ok(())
            })
        })
}
