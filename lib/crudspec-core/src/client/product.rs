//! Typed payloads for the reference "products" resource.

use serde::{Deserialize, Serialize};

/// Fields a client must send when creating a product.
pub const PRODUCT_REQUIRED_FIELDS: [&str; 2] = ["name", "price"];

/// Fields only the server assigns.
pub const PRODUCT_SERVER_FIELDS: [&str; 2] = ["id", "createdAt"];

/// A product as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Server-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category, absent when the server stores none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Unit price.
    pub price: f64,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server-assigned creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The mutable fields of a product, used for creation and full replacement.
///
/// `category` and `description` are omitted from the payload when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name, required.
    pub name: String,
    /// Optional category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Unit price, required.
    pub price: f64,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewProduct {
    /// A product with only the required fields set.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            category: None,
            price,
            description: None,
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A product named `{prefix}-xxxxx` with a random suffix, so parallel runs never collide.
    pub fn unique(prefix: &str, price: f64) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let suffix = suffix.get(..5).unwrap_or(&suffix);
        Self::new(format!("{prefix}-{suffix}"), price)
    }
}

/// A partial update: only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_product_omits_unset_optional_fields() {
        let product = NewProduct::new("Produto-X", 199.9).with_category("Categoria Teste");

        let value = serde_json::to_value(&product).expect("serializable");

        assert_eq!(
            value,
            json!({"name": "Produto-X", "category": "Categoria Teste", "price": 199.9})
        );
    }

    #[test]
    fn test_unique_product_name() {
        let first = NewProduct::unique("Produto", 10.0);
        let second = NewProduct::unique("Produto", 10.0);

        assert!(first.name.starts_with("Produto-"));
        assert_eq!(first.name.len(), "Produto-".len() + 5);
        assert_ne!(first.name, second.name);
    }

    #[test]
    fn test_patch_only_sends_set_fields() {
        let patch = ProductPatch {
            price: Some(42.0),
            ..Default::default()
        };

        let value = serde_json::to_value(&patch).expect("serializable");

        assert_eq!(value, json!({"price": 42.0}));
    }

    #[test]
    fn test_product_reads_created_at() {
        let product: Product = serde_json::from_value(json!({
            "id": "3",
            "name": "Produto",
            "price": 5,
            "createdAt": "2025-10-21T10:00:00Z"
        }))
        .expect("valid product");

        assert_eq!(product.created_at.as_deref(), Some("2025-10-21T10:00:00Z"));
        assert!(product.category.is_none());
    }
}
