use std::time::Duration;

use headers::{ContentType, HeaderMapExt};
use http::{HeaderMap, StatusCode};
use mime::Mime;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::HarnessError;

/// Uniform representation of an HTTP response used by every assertion.
///
/// A non-2xx status is not an error: the status code is part of the result.
/// The body is parsed as JSON when possible; a non-JSON body is kept as a JSON
/// string, and an empty body is `None`.
#[derive(Debug, Clone)]
pub struct NormalizedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Value>,
    elapsed: Duration,
}

impl NormalizedResponse {
    pub(super) async fn from_response(
        response: Response,
        elapsed: Duration,
    ) -> Result<Self, HarnessError> {
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;
        let body = parse_body(&text);
        debug!(%status, ?elapsed, "normalized response");

        Ok(Self {
            status,
            headers,
            body,
            elapsed,
        })
    }

    /// Builds a response by hand, e.g. for a fake delete function in tests.
    pub fn new(status: StatusCode, body: Option<Value>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
            elapsed: Duration::ZERO,
        }
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The status code as a number.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The declared `Content-Type`, if any.
    pub fn content_type(&self) -> Option<Mime> {
        self.headers.typed_get::<ContentType>().map(Mime::from)
    }

    /// Returns `true` when the server declared a JSON body.
    pub fn is_json(&self) -> bool {
        self.content_type().is_some_and(|content_type| {
            content_type.subtype() == mime::JSON || content_type.suffix() == Some(mime::JSON)
        })
    }

    /// The parsed body, `None` when the body was empty.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Time between sending the request and reading the whole body.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reads the `id` field of an object body.
    ///
    /// Numeric ids are rendered as strings.
    pub fn id(&self) -> Option<String> {
        match self.body.as_ref()?.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Fails with [`HarnessError::JsonError`] carrying the location of the mismatch.
    pub fn json<T>(&self) -> Result<T, HarnessError>
    where
        T: DeserializeOwned,
    {
        let value = self.body.clone().unwrap_or(Value::Null);
        serde_path_to_error::deserialize(value).map_err(|err| HarnessError::JsonError {
            path: err.path().to_string(),
            error: err.into_inner(),
        })
    }
}

fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    let value = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
    Some(value)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_body_empty_is_none() {
        assert_eq!(parse_body(""), None);
        assert_eq!(parse_body("  \n"), None);
    }

    #[test]
    fn test_parse_body_json() {
        let body = parse_body(r#"{"id": "1", "name": "Produto"}"#);

        assert_eq!(body, Some(json!({"id": "1", "name": "Produto"})));
    }

    #[test]
    fn test_parse_body_text_is_kept_as_string() {
        let body = parse_body("Not found");

        assert_eq!(body, Some(json!("Not found")));
    }

    #[test]
    fn test_id_from_string_or_number() {
        let response = NormalizedResponse::new(StatusCode::CREATED, Some(json!({"id": "42"})));
        assert_eq!(response.id().as_deref(), Some("42"));

        let response = NormalizedResponse::new(StatusCode::CREATED, Some(json!({"id": 7})));
        assert_eq!(response.id().as_deref(), Some("7"));

        let response = NormalizedResponse::new(StatusCode::NOT_FOUND, Some(json!("Not found")));
        assert_eq!(response.id(), None);
    }

    #[test]
    fn test_content_type() {
        let mut response = NormalizedResponse::new(StatusCode::OK, Some(json!([])));
        assert_eq!(response.content_type(), None);
        assert!(!response.is_json());

        response
            .headers
            .typed_insert(ContentType::from(mime::APPLICATION_JSON));

        assert_eq!(response.content_type(), Some(mime::APPLICATION_JSON));
        assert!(response.is_json());
    }

    #[test]
    fn test_json_error_reports_path() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Named {
            name: String,
        }

        let response = NormalizedResponse::new(StatusCode::OK, Some(json!([{"name": 12}])));
        let result = response.json::<Vec<Named>>();

        let Err(HarnessError::JsonError { path, .. }) = result else {
            panic!("expected a JSON error, got {result:?}");
        };
        assert_eq!(path, "[0].name");
    }
}
