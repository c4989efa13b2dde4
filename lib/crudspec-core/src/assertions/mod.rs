//! Assertion vocabulary over [`NormalizedResponse`].
//!
//! Each assertion returns the response on success so checks can be chained with `?`,
//! and an [`AssertionFailure`] describing expected vs actual on mismatch.
//!
//! ```rust
//! use crudspec_core::{NormalizedResponse, ResponseAssertions};
//! use http::StatusCode;
//! use serde_json::json;
//!
//! # fn example() -> Result<(), crudspec_core::AssertionFailure> {
//! let response = NormalizedResponse::new(
//!     StatusCode::CREATED,
//!     Some(json!({"id": "1", "name": "Produto-X", "category": "Categoria Teste"})),
//! );
//!
//! response
//!     .assert_status(201)?
//!     .assert_field_equals("name", "Produto-X")?
//!     .assert_field_present("id")?;
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::ops::RangeInclusive;

use regex::Regex;
use serde_json::Value;

use crate::client::NormalizedResponse;

mod path;
pub use self::path::FieldPath;

/// An expected/actual mismatch.
#[derive(Debug, Clone, PartialEq, derive_more::Error, derive_more::Display)]
#[display("{assertion} failed: expected {expected}, got {actual}")]
pub struct AssertionFailure {
    assertion: &'static str,
    expected: String,
    actual: String,
}

impl AssertionFailure {
    /// A failure of `assertion`; both values are rendered with [`Display`].
    pub fn new(
        assertion: &'static str,
        expected: impl Display,
        actual: impl Display,
    ) -> Self {
        Self {
            assertion,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Name of the failed assertion, e.g. `assert_status`.
    pub fn assertion(&self) -> &'static str {
        self.assertion
    }

    /// Expected value, as rendered in the message.
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Actual value, as rendered in the message.
    pub fn actual(&self) -> &str {
        &self.actual
    }
}

/// Assertions on a [`NormalizedResponse`].
pub trait ResponseAssertions {
    /// The status code equals `expected`.
    ///
    /// # Errors
    ///
    /// On mismatch.
    fn assert_status(&self, expected: u16) -> Result<&Self, AssertionFailure>;

    /// The status code lies in `range`, e.g. `200..=299`.
    ///
    /// # Errors
    ///
    /// On mismatch.
    fn assert_status_in(&self, range: RangeInclusive<u16>) -> Result<&Self, AssertionFailure>;

    /// The value at `path` equals `expected`; numbers compare numerically.
    ///
    /// # Errors
    ///
    /// On mismatch, missing field, or invalid path.
    fn assert_field_equals(
        &self,
        path: &str,
        expected: impl Into<Value>,
    ) -> Result<&Self, AssertionFailure>;

    /// The value at `path` exists and is not null.
    ///
    /// # Errors
    ///
    /// On missing or null field, or invalid path.
    fn assert_field_present(&self, path: &str) -> Result<&Self, AssertionFailure>;

    /// The value at `path` is a string matching `pattern`.
    ///
    /// # Errors
    ///
    /// On mismatch, non-string value, invalid path or invalid pattern.
    fn assert_field_matches(&self, path: &str, pattern: &str) -> Result<&Self, AssertionFailure>;

    /// The body is a list and every element has a non-null `field`.
    ///
    /// # Errors
    ///
    /// On a non-list body or the first element lacking the field.
    fn assert_field_present_in_each_element(
        &self,
        field: &str,
    ) -> Result<&Self, AssertionFailure>;

    /// The body is a non-empty list.
    ///
    /// # Errors
    ///
    /// On a non-list or empty body.
    fn assert_non_empty_list(&self) -> Result<&Self, AssertionFailure>;

    /// The first list element whose `predicate_field` equals `predicate_value` has
    /// `target_field` equal to `expected`.
    ///
    /// # Errors
    ///
    /// On a non-list body, when no element matches the predicate, or on mismatch.
    fn assert_element_matching(
        &self,
        predicate_field: &str,
        predicate_value: impl Into<Value>,
        target_field: &str,
        expected: impl Into<Value>,
    ) -> Result<&Self, AssertionFailure>;
}

impl ResponseAssertions for NormalizedResponse {
    fn assert_status(&self, expected: u16) -> Result<&Self, AssertionFailure> {
        let actual = self.status_code();
        if actual != expected {
            return Err(AssertionFailure::new(
                "assert_status",
                expected,
                describe_status(self),
            ));
        }
        Ok(self)
    }

    fn assert_status_in(&self, range: RangeInclusive<u16>) -> Result<&Self, AssertionFailure> {
        if !range.contains(&self.status_code()) {
            return Err(AssertionFailure::new(
                "assert_status_in",
                format!("{}..={}", range.start(), range.end()),
                describe_status(self),
            ));
        }
        Ok(self)
    }

    fn assert_field_equals(
        &self,
        path: &str,
        expected: impl Into<Value>,
    ) -> Result<&Self, AssertionFailure> {
        let expected = expected.into();
        let actual = field(self, "assert_field_equals", path)?;
        match actual {
            Some(actual) if json_eq(actual, &expected) => Ok(self),
            Some(actual) => Err(AssertionFailure::new(
                "assert_field_equals",
                format!("{path} == {expected}"),
                actual,
            )),
            None => Err(AssertionFailure::new(
                "assert_field_equals",
                format!("{path} == {expected}"),
                format!("no value at {path}"),
            )),
        }
    }

    fn assert_field_present(&self, path: &str) -> Result<&Self, AssertionFailure> {
        match field(self, "assert_field_present", path)? {
            Some(value) if !value.is_null() => Ok(self),
            Some(_) => Err(AssertionFailure::new(
                "assert_field_present",
                format!("non-null {path}"),
                "null",
            )),
            None => Err(AssertionFailure::new(
                "assert_field_present",
                format!("non-null {path}"),
                format!("no value at {path}"),
            )),
        }
    }

    fn assert_field_matches(&self, path: &str, pattern: &str) -> Result<&Self, AssertionFailure> {
        let regex = Regex::new(pattern).map_err(|err| {
            AssertionFailure::new("assert_field_matches", "a valid pattern", err)
        })?;
        match field(self, "assert_field_matches", path)? {
            Some(Value::String(text)) if regex.is_match(text) => Ok(self),
            Some(actual) => Err(AssertionFailure::new(
                "assert_field_matches",
                format!("{path} =~ /{pattern}/"),
                actual,
            )),
            None => Err(AssertionFailure::new(
                "assert_field_matches",
                format!("{path} =~ /{pattern}/"),
                format!("no value at {path}"),
            )),
        }
    }

    fn assert_field_present_in_each_element(
        &self,
        field_name: &str,
    ) -> Result<&Self, AssertionFailure> {
        let elements = list(self, "assert_field_present_in_each_element")?;
        let missing = elements
            .iter()
            .position(|element| element.get(field_name).is_none_or(Value::is_null));
        if let Some(index) = missing {
            return Err(AssertionFailure::new(
                "assert_field_present_in_each_element",
                format!("non-null {field_name} in every element"),
                format!("element [{index}] has no {field_name}"),
            ));
        }
        Ok(self)
    }

    fn assert_non_empty_list(&self) -> Result<&Self, AssertionFailure> {
        let elements = list(self, "assert_non_empty_list")?;
        if elements.is_empty() {
            return Err(AssertionFailure::new(
                "assert_non_empty_list",
                "a non-empty list",
                "[]",
            ));
        }
        Ok(self)
    }

    fn assert_element_matching(
        &self,
        predicate_field: &str,
        predicate_value: impl Into<Value>,
        target_field: &str,
        expected: impl Into<Value>,
    ) -> Result<&Self, AssertionFailure> {
        let predicate_value = predicate_value.into();
        let expected = expected.into();
        let elements = list(self, "assert_element_matching")?;

        let Some(element) = elements.iter().find(|element| {
            element
                .get(predicate_field)
                .is_some_and(|value| json_eq(value, &predicate_value))
        }) else {
            return Err(AssertionFailure::new(
                "assert_element_matching",
                format!("an element with {predicate_field} == {predicate_value}"),
                format!("none among {} elements", elements.len()),
            ));
        };

        match element.get(target_field) {
            Some(actual) if json_eq(actual, &expected) => Ok(self),
            actual => Err(AssertionFailure::new(
                "assert_element_matching",
                format!(
                    "{target_field} == {expected} where {predicate_field} == {predicate_value}"
                ),
                actual.map_or_else(|| format!("no {target_field}"), ToString::to_string),
            )),
        }
    }
}

fn describe_status(response: &NormalizedResponse) -> String {
    match response.body() {
        Some(body) => format!("{} with body {body}", response.status_code()),
        None => response.status_code().to_string(),
    }
}

fn field<'r>(
    response: &'r NormalizedResponse,
    assertion: &'static str,
    path: &str,
) -> Result<Option<&'r Value>, AssertionFailure> {
    let field_path =
        FieldPath::parse(path).map_err(|err| AssertionFailure::new(assertion, "a valid path", err))?;
    Ok(response.body().and_then(|body| field_path.resolve(body)))
}

fn list<'r>(
    response: &'r NormalizedResponse,
    assertion: &'static str,
) -> Result<&'r Vec<Value>, AssertionFailure> {
    match response.body() {
        Some(Value::Array(elements)) => Ok(elements),
        Some(other) => Err(AssertionFailure::new(assertion, "a list body", other)),
        None => Err(AssertionFailure::new(assertion, "a list body", "an empty body")),
    }
}

/// JSON equality where numbers compare by value (`100` equals `100.0`).
fn json_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(left), Value::Number(right)) => match (left.as_f64(), right.as_f64()) {
            (Some(left), Some(right)) => (left - right).abs() <= f64::EPSILON * left.abs().max(1.0),
            _ => left == right,
        },
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(lhs, rhs)| json_eq(lhs, rhs))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, value)| right.get(key).is_some_and(|other| json_eq(value, other)))
        }
        _ => actual == expected,
    }
}
