use std::time::Instant;

use headers::{ContentType, HeaderMapExt};
use http::Method;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Body, Request};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

mod builder;
pub use self::builder::{DEFAULT_REQUEST_TIMEOUT, ResourceClientBuilder};

mod error;
pub use self::error::{FailureKind, HarnessError};

pub mod product;

mod response;
pub use self::response::NormalizedResponse;

/// Characters escaped in an id path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// How [`ResourceClient::update`] changes an existing resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum UpdateMode {
    /// `PUT`: every mutable field is replaced.
    #[display("PUT")]
    Replace,
    /// `PATCH`: only the provided fields change.
    #[display("PATCH")]
    Patch,
}

impl UpdateMode {
    fn method(self) -> Method {
        match self {
            Self::Replace => Method::PUT,
            Self::Patch => Method::PATCH,
        }
    }
}

/// HTTP client bound to one REST resource collection.
///
/// Every operation returns a [`NormalizedResponse`]; a non-2xx status is part of the
/// result, not an error. Errors are reserved for transport failures and caller
/// mistakes, the latter detected before any network call.
///
/// # Example
///
/// ```rust,no_run
/// use crudspec_core::ResourceClient;
/// use crudspec_core::product::NewProduct;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ResourceClient::builder()
///     .with_base_url("https://api.example.com")?
///     .with_base_path("/products")?
///     .for_products()
///     .build()?;
///
/// let created = client.create(&NewProduct::new("Produto-X", 199.90)).await?;
/// assert_eq!(created.status_code(), 201);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResourceClient {
    client: reqwest::Client,
    base_url: Url,
    base_path: String,
    required_fields: Vec<String>,
    server_fields: Vec<String>,
}

impl ResourceClient {
    /// Starts a [`ResourceClientBuilder`] with default settings.
    pub fn builder() -> ResourceClientBuilder {
        ResourceClientBuilder::default()
    }

    /// URL of the collection, `{baseUrl}{basePath}`.
    pub fn collection_url(&self) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{}", self.base_path));
        url
    }

    /// URL of one resource, `{baseUrl}{basePath}/{id}` with the id percent-encoded.
    ///
    /// # Errors
    ///
    /// Fails with [`HarnessError::EmptyId`] for an empty or blank id.
    pub fn resource_url(&self, id: &str) -> Result<Url, HarnessError> {
        self.resource_url_for("resource_url", id)
    }

    fn resource_url_for(&self, operation: &'static str, id: &str) -> Result<Url, HarnessError> {
        if id.trim().is_empty() {
            return Err(HarnessError::EmptyId { operation });
        }
        let collection = self.collection_url();
        let segment = utf8_percent_encode(id, SEGMENT);
        let url = format!("{}/{segment}", collection.as_str().trim_end_matches('/'));
        Ok(url.parse()?)
    }
}

// Operations
impl ResourceClient {
    /// `GET {basePath}`.
    ///
    /// # Errors
    ///
    /// Only transport failures.
    pub async fn list(&self) -> Result<NormalizedResponse, HarnessError> {
        self.exchange(Method::GET, self.collection_url(), None).await
    }

    /// `GET {basePath}/{id}`.
    ///
    /// # Errors
    ///
    /// [`HarnessError::EmptyId`] without any network call, or a transport failure.
    pub async fn get_by_id(&self, id: &str) -> Result<NormalizedResponse, HarnessError> {
        let url = self.resource_url_for("get_by_id", id)?;
        self.exchange(Method::GET, url, None).await
    }

    /// `POST {basePath}` with `fields` as the JSON body.
    ///
    /// The server assigns the id and creation timestamp.
    ///
    /// # Errors
    ///
    /// Caller errors when the payload is not an object, lacks a required field, or sets
    /// a server-assigned field; otherwise only transport failures.
    pub async fn create<T>(&self, fields: &T) -> Result<NormalizedResponse, HarnessError>
    where
        T: Serialize + ?Sized,
    {
        let body = self.payload("create", fields, true)?;
        self.exchange(Method::POST, self.collection_url(), Some(body))
            .await
    }

    /// `PUT` or `PATCH` on `{basePath}/{id}` depending on `mode`.
    ///
    /// # Errors
    ///
    /// Same caller errors as [`create`](Self::create) (required fields are only
    /// checked for [`UpdateMode::Replace`]), plus [`HarnessError::EmptyId`].
    pub async fn update<T>(
        &self,
        id: &str,
        fields: &T,
        mode: UpdateMode,
    ) -> Result<NormalizedResponse, HarnessError>
    where
        T: Serialize + ?Sized,
    {
        let operation = match mode {
            UpdateMode::Replace => "replace",
            UpdateMode::Patch => "patch",
        };
        let url = self.resource_url_for(operation, id)?;
        let body = self.payload(operation, fields, mode == UpdateMode::Replace)?;
        self.exchange(mode.method(), url, Some(body)).await
    }

    /// `PUT {basePath}/{id}`, replacing every mutable field.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn replace<T>(&self, id: &str, fields: &T) -> Result<NormalizedResponse, HarnessError>
    where
        T: Serialize + ?Sized,
    {
        self.update(id, fields, UpdateMode::Replace).await
    }

    /// `PATCH {basePath}/{id}`, changing only the given fields.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn patch<T>(&self, id: &str, fields: &T) -> Result<NormalizedResponse, HarnessError>
    where
        T: Serialize + ?Sized,
    {
        self.update(id, fields, UpdateMode::Patch).await
    }

    /// `DELETE {basePath}/{id}`.
    ///
    /// Deleting twice is not an error: the second call yields the server's 404.
    ///
    /// # Errors
    ///
    /// [`HarnessError::EmptyId`] without any network call, or a transport failure.
    pub async fn delete(&self, id: &str) -> Result<NormalizedResponse, HarnessError> {
        let url = self.resource_url_for("delete", id)?;
        self.exchange(Method::DELETE, url, None).await
    }
}

impl ResourceClient {
    fn payload<T>(
        &self,
        operation: &'static str,
        fields: &T,
        check_required: bool,
    ) -> Result<Value, HarnessError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(fields)?;
        let Value::Object(object) = &value else {
            return Err(HarnessError::NotAnObject { operation, value });
        };

        if let Some(field) = self
            .server_fields
            .iter()
            .find(|field| object.contains_key(field.as_str()))
        {
            return Err(HarnessError::ServerOnlyField {
                operation,
                field: field.clone(),
            });
        }

        if check_required
            && let Some(field) = self
                .required_fields
                .iter()
                .find(|field| object.get(field.as_str()).is_none_or(Value::is_null))
        {
            return Err(HarnessError::MissingField {
                operation,
                field: field.clone(),
            });
        }

        Ok(value)
    }

    async fn exchange(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<NormalizedResponse, HarnessError> {
        let mut request = Request::new(method, url);
        if let Some(body) = body {
            request.headers_mut().typed_insert(ContentType::json());
            *request.body_mut() = Some(Body::from(serde_json::to_vec(&body)?));
        }

        debug!(?request, "sending...");
        let start = Instant::now();
        let response = self.client.execute(request).await?;
        debug!(?response, "...receiving");

        NormalizedResponse::from_response(response, start.elapsed()).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::product::NewProduct;
    use super::*;

    fn products_client() -> ResourceClient {
        // port 9 (discard): any accidental network call fails fast
        ResourceClient::builder()
            .with_base_url("http://127.0.0.1:9")
            .expect("valid url")
            .with_base_path("/api/products")
            .expect("valid path")
            .for_products()
            .build()
            .expect("client")
    }

    #[test]
    fn test_resource_url() {
        let client = products_client();

        let url = client.resource_url("42").expect("valid id");

        assert_eq!(url.as_str(), "http://127.0.0.1:9/api/products/42");
    }

    #[test]
    fn test_resource_url_escapes_id() {
        let client = products_client();

        let url = client.resource_url("a/b c").expect("valid id");

        assert_eq!(url.as_str(), "http://127.0.0.1:9/api/products/a%2Fb%20c");
    }

    #[tokio::test]
    async fn test_empty_id_fails_before_network() {
        let client = products_client();

        for id in ["", "   "] {
            let result = client.get_by_id(id).await;
            assert!(
                matches!(result, Err(HarnessError::EmptyId { operation: "get_by_id" })),
                "{result:?}"
            );
        }

        let result = client.delete("").await;
        assert!(matches!(
            result,
            Err(HarnessError::EmptyId {
                operation: "delete"
            })
        ));

        let result = client.replace("", &NewProduct::new("x", 1.0)).await;
        assert!(matches!(
            result,
            Err(HarnessError::EmptyId {
                operation: "replace"
            })
        ));
    }

    #[tokio::test]
    async fn test_create_requires_name_and_price() {
        let client = products_client();

        let result = client.create(&json!({"name": "Produto"})).await;

        let Err(HarnessError::MissingField { field, .. }) = result else {
            panic!("expected a missing field, got {result:?}");
        };
        assert_eq!(field, "price");
    }

    #[tokio::test]
    async fn test_create_rejects_server_fields() {
        let client = products_client();

        let result = client
            .create(&json!({"id": "1", "name": "Produto", "price": 1.0}))
            .await;

        let Err(HarnessError::ServerOnlyField { field, .. }) = result else {
            panic!("expected a server-only field, got {result:?}");
        };
        assert_eq!(field, "id");
    }

    #[tokio::test]
    async fn test_create_rejects_non_object_payload() {
        let client = products_client();

        let result = client.create(&json!(["Produto"])).await;

        assert!(matches!(result, Err(HarnessError::NotAnObject { .. })));
    }

    #[test]
    fn test_patch_payload_skips_required_fields() {
        let client = products_client();

        let payload = client
            .payload("patch", &json!({"price": 10.0}), false)
            .expect("partial payload accepted");

        assert_eq!(payload, json!({"price": 10.0}));
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_network_failure() {
        let client = products_client();

        let result = client.list().await;

        let Err(error) = result else {
            panic!("nothing should listen on port 9");
        };
        assert_eq!(error.failure_kind(), FailureKind::Network);
    }

    #[test]
    fn test_update_mode_display() {
        assert_eq!(UpdateMode::Replace.to_string(), "PUT");
        assert_eq!(UpdateMode::Patch.to_string(), "PATCH");
    }
}
