//! Field locators into a parsed JSON body.
//!
//! Three syntaxes are accepted, detected from the first character:
//! - `$...` → JSONPath (RFC 9535), the first match is used
//! - `/...` → JSON Pointer (RFC 6901)
//! - anything else → dotted/bracket notation: `name`, `items[0].name`, `[2].id`

use jsonptr::Pointer;
use jsonptr::resolve::Resolve;
use serde_json::Value;
use serde_json_path::JsonPath;

/// A parsed field locator.
#[derive(Debug, Clone)]
pub enum FieldPath {
    /// JSON Pointer, also the target of dotted/bracket paths.
    Pointer(String),
    /// JSONPath query.
    JsonPath(JsonPath),
}

impl FieldPath {
    /// Parses a locator.
    ///
    /// # Errors
    ///
    /// Returns a message describing the syntax problem.
    pub fn parse(path: &str) -> Result<Self, String> {
        if path.starts_with('$') {
            let json_path =
                JsonPath::parse(path).map_err(|err| format!("Invalid JSONPath '{path}': {err}"))?;
            return Ok(Self::JsonPath(json_path));
        }
        if path.starts_with('/') || path.is_empty() {
            Pointer::parse(path).map_err(|err| format!("Invalid JSON Pointer '{path}': {err}"))?;
            return Ok(Self::Pointer(path.to_string()));
        }

        let tokens = dotted_tokens(path)?;
        let pointer = tokens.iter().fold(String::new(), |mut acc, token| {
            acc.push('/');
            acc.push_str(&token.replace('~', "~0").replace('/', "~1"));
            acc
        });
        Ok(Self::Pointer(pointer))
    }

    /// Resolves the locator against `value`.
    pub fn resolve<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match self {
            Self::Pointer(pointer) => {
                let ptr = Pointer::parse(pointer).ok()?;
                value.resolve(ptr).ok()
            }
            Self::JsonPath(path) => path.query(value).first(),
        }
    }
}

fn dotted_tokens(path: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if current.is_empty() && tokens.is_empty() {
                    return Err(format!("Invalid field path '{path}': leading '.'"));
                }
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                let mut index = String::new();
                let mut closed = false;
                for it in chars.by_ref() {
                    if it == ']' {
                        closed = true;
                        break;
                    }
                    index.push(it);
                }
                if !closed {
                    return Err(format!("Invalid field path '{path}': unbalanced '['"));
                }
                if index.is_empty() || !index.chars().all(|it| it.is_ascii_digit()) {
                    return Err(format!(
                        "Invalid field path '{path}': bad index '[{index}]'"
                    ));
                }
                tokens.push(index);
            }
            ']' => return Err(format!("Invalid field path '{path}': unbalanced ']'")),
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}
