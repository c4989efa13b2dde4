use std::fmt::Debug;
use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::uri::PathAndQuery;
use url::Url;

use super::{HarnessError, ResourceClient};
use crate::client::product::{PRODUCT_REQUIRED_FIELDS, PRODUCT_SERVER_FIELDS};

/// Default timeout applied to every request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`ResourceClient`].
///
/// # Default Configuration
///
/// - **Base URL**: `http://127.0.0.1`
/// - **Base path**: `/`
/// - **Timeout**: [`DEFAULT_REQUEST_TIMEOUT`]
/// - **Required / server-only fields**: none
///
/// # Example
///
/// ```rust
/// use crudspec_core::ResourceClient;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ResourceClient::builder()
///     .with_base_url("https://api.example.com")?
///     .with_base_path("/v1/products")?
///     .with_required_fields(["name", "price"])
///     .with_server_fields(["id", "createdAt"])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResourceClientBuilder {
    base_url: Option<Url>,
    port: Option<u16>,
    base_path: Option<PathAndQuery>,
    timeout: Duration,
    headers: HeaderMap,
    required_fields: Vec<String>,
    server_fields: Vec<String>,
}

impl Default for ResourceClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            port: None,
            base_path: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            headers: HeaderMap::new(),
            required_fields: Vec::new(),
            server_fields: Vec::new(),
        }
    }
}

impl ResourceClientBuilder {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Fails if the underlying reqwest client cannot be created.
    pub fn build(self) -> Result<ResourceClient, HarnessError> {
        let Self {
            base_url,
            port,
            base_path,
            timeout,
            headers,
            required_fields,
            server_fields,
        } = self;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let mut base_url = match base_url {
            Some(url) => url,
            None => Url::parse("http://127.0.0.1")?,
        };
        if let Some(port) = port {
            base_url
                .set_port(Some(port))
                .map_err(|()| HarnessError::InvalidBaseUrl {
                    url: base_url.to_string(),
                    error: format!("cannot set port {port}"),
                })?;
        }

        let base_path = base_path
            .as_ref()
            .map(|it| it.path().trim_end_matches('/').to_string())
            .unwrap_or_default();

        Ok(ResourceClient {
            client,
            base_url,
            base_path,
            required_fields,
            server_fields,
        })
    }

    /// Sets the base URL (scheme, host, optional port).
    ///
    /// Any path on the URL is kept as a prefix of the base path.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidBaseUrl`] when the URL cannot be parsed or cannot
    /// carry a path (e.g. `mailto:`).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, HarnessError> {
        let url = Url::parse(base_url).map_err(|err| HarnessError::InvalidBaseUrl {
            url: base_url.to_string(),
            error: err.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(HarnessError::InvalidBaseUrl {
                url: base_url.to_string(),
                error: "cannot be a base".to_string(),
            });
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Replaces the port of the base URL.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the path of the resource collection, e.g. `/testesdeapi/products`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidBasePath`] if the path contains invalid characters
    /// (such as spaces) or cannot be parsed as a valid URI path.
    pub fn with_base_path<P>(mut self, base_path: P) -> Result<Self, HarnessError>
    where
        P: TryInto<PathAndQuery>,
        P::Error: Debug + 'static,
    {
        let base_path = base_path
            .try_into()
            .map_err(|err| HarnessError::InvalidBasePath {
                error: format!("{err:?}"),
            })?;
        if base_path.query().is_some() {
            return Err(HarnessError::InvalidBasePath {
                error: format!("query string not allowed in base path: {base_path}"),
            });
        }
        self.base_path = Some(base_path);
        Ok(self)
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request.
    ///
    /// # Errors
    ///
    /// Fails if the header name or value is invalid.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, HarnessError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Fields that `create` payloads must contain.
    pub fn with_required_fields<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Fields that only the server assigns; payloads setting them are rejected.
    pub fn with_server_fields<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.server_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Applies the product resource rules: `name` and `price` required,
    /// `id` and `createdAt` server-assigned.
    pub fn for_products(self) -> Self {
        self.with_required_fields(PRODUCT_REQUIRED_FIELDS)
            .with_server_fields(PRODUCT_SERVER_FIELDS)
    }
}
