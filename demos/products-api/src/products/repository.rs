use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;

use super::domain::{NewProduct, PatchProduct, Product, ProductData, ProductId};
use crate::errors::RepositoryError;

/// Initial content of the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seed {
    /// The four products of the bundled catalogue.
    #[default]
    Catalogue,
    /// No product; ids start at 1.
    Empty,
}

#[derive(Clone)]
pub(crate) struct ProductRepository {
    data: Arc<RwLock<BTreeMap<ProductId, ProductData>>>,
    // ids are never reused, even after the highest one is deleted
    next_id: Arc<AtomicU64>,
}

impl ProductRepository {
    pub(crate) fn new(seed: Seed) -> Result<Self, RepositoryError> {
        let data: BTreeMap<ProductId, ProductData> = match seed {
            Seed::Catalogue => {
                let json = include_str!("./db.json");
                let products = serde_json::from_str::<Vec<Product>>(json)?;
                products.into_iter().map(Product::split).collect()
            }
            Seed::Empty => BTreeMap::new(),
        };
        let next_id = data
            .keys()
            .map(|id| id.0)
            .max()
            .map_or(1, |max| max + 1);
        let data = Arc::new(RwLock::new(data));
        let next_id = Arc::new(AtomicU64::new(next_id));

        Ok(Self { data, next_id })
    }

    pub(crate) async fn list(&self) -> Vec<Product> {
        let data = self.data.read().await;
        data.iter()
            .map(|(id, data)| Product::from((*id, data.clone())))
            .collect()
    }

    pub(crate) async fn count(&self) -> usize {
        self.data.read().await.len()
    }

    pub(crate) async fn get(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let data = self.data.read().await;
        let Some(value) = data.get(&id) else {
            return Err(RepositoryError::ProductNotFound);
        };

        Ok(Product::from((id, value.clone())))
    }

    pub(crate) async fn create(&self, new_product: NewProduct) -> Product {
        let mut data = self.data.write().await;
        let id = ProductId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let NewProduct {
            name,
            category,
            price,
            description,
        } = new_product;
        let value = ProductData {
            name,
            category,
            price,
            description,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        data.insert(id, value.clone());

        Product::from((id, value))
    }

    pub(crate) async fn replace(
        &self,
        id: ProductId,
        product: NewProduct,
    ) -> Result<Product, RepositoryError> {
        let mut data = self.data.write().await;
        let Some(value) = data.get_mut(&id) else {
            return Err(RepositoryError::ProductNotFound);
        };

        let NewProduct {
            name,
            category,
            price,
            description,
        } = product;
        value.name = name;
        value.category = category;
        value.price = price;
        value.description = description;

        Ok(Product::from((id, value.clone())))
    }

    pub(crate) async fn patch(
        &self,
        id: ProductId,
        patch: PatchProduct,
    ) -> Result<Product, RepositoryError> {
        let mut data = self.data.write().await;
        let Some(value) = data.get_mut(&id) else {
            return Err(RepositoryError::ProductNotFound);
        };

        let PatchProduct {
            name,
            category,
            price,
            description,
        } = patch;
        if let Some(name) = name {
            value.name = name;
        }
        if let Some(price) = price {
            value.price = price;
        }
        if category.is_some() {
            value.category = category;
        }
        if description.is_some() {
            value.description = description;
        }

        Ok(Product::from((id, value.clone())))
    }

    pub(crate) async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let mut data = self.data.write().await;
        let Some(value) = data.remove(&id) else {
            return Err(RepositoryError::ProductNotFound);
        };

        Ok(Product::from((id, value)))
    }
}

impl Product {
    fn split(self) -> (ProductId, ProductData) {
        let Self { id, data } = self;
        (id, data)
    }
}

impl From<(ProductId, ProductData)> for Product {
    fn from(value: (ProductId, ProductData)) -> Self {
        let (id, data) = value;
        Self { id, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, price: f64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category: Some("Categoria Teste".to_string()),
            price,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_seeded_products() {
        let repository = ProductRepository::new(Seed::Catalogue).expect("valid seed");

        let products = repository.list().await;

        assert_eq!(products.len(), 4);
        assert!(products.windows(2).all(|pair| match pair {
            [first, second] => first.id < second.id,
            _ => false,
        }));
    }

    #[tokio::test]
    async fn test_empty_seed_starts_at_one() {
        let repository = ProductRepository::new(Seed::Empty).expect("empty");

        assert_eq!(repository.count().await, 0);
        let created = repository.create(new_product("Produto", 1.0)).await;
        assert_eq!(created.id, ProductId(1));
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let repository = ProductRepository::new(Seed::Catalogue).expect("valid seed");

        let created = repository.create(new_product("Produto-X", 199.9)).await;

        assert_eq!(created.id, ProductId(5));
        assert!(created.data.created_at.ends_with('Z'));
        assert_eq!(repository.get(created.id).await.ok(), Some(created));
    }

    #[tokio::test]
    async fn test_deleted_id_is_never_reissued() {
        let repository = ProductRepository::new(Seed::Catalogue).expect("valid seed");

        let first = repository.create(new_product("Produto", 1.0)).await;
        repository.delete(first.id).await.expect("existing product");
        let second = repository.create(new_product("Produto", 1.0)).await;

        assert_eq!(first.id, ProductId(5));
        assert_eq!(second.id, ProductId(6));
        assert!(matches!(
            repository.get(first.id).await,
            Err(RepositoryError::ProductNotFound)
        ));
    }

    #[tokio::test]
    async fn test_patch_keeps_unset_fields() {
        let repository = ProductRepository::new(Seed::Catalogue).expect("valid seed");
        let created = repository.create(new_product("Produto", 100.0)).await;

        let patched = repository
            .patch(
                created.id,
                PatchProduct {
                    price: Some(80.0),
                    ..Default::default()
                },
            )
            .await
            .expect("existing product");

        assert_eq!(patched.data.price, 80.0);
        assert_eq!(patched.data.name, "Produto");
        assert_eq!(patched.data.category.as_deref(), Some("Categoria Teste"));
    }

    #[tokio::test]
    async fn test_replace_clears_unset_optional_fields() {
        let repository = ProductRepository::new(Seed::Catalogue).expect("valid seed");
        let created = repository.create(new_product("Produto", 100.0)).await;

        let replaced = repository
            .replace(
                created.id,
                NewProduct {
                    name: "Outro".to_string(),
                    category: None,
                    price: 5.0,
                    description: None,
                },
            )
            .await
            .expect("existing product");

        assert_eq!(replaced.data.name, "Outro");
        assert_eq!(replaced.data.category, None);
        assert_eq!(replaced.data.created_at, created.data.created_at);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repository = ProductRepository::new(Seed::Catalogue).expect("valid seed");

        assert!(repository.delete(ProductId(1)).await.is_ok());
        assert!(matches!(
            repository.delete(ProductId(1)).await,
            Err(RepositoryError::ProductNotFound)
        ));
    }
}
