//! YAML output for reports, behind the `yaml` feature.

use serde::Serialize;

/// Error raised by the YAML serializer.
pub type YamlError = serde_saphyr::ser_error::Error;

/// Serializes any [`Serialize`] value to YAML.
pub trait ToYaml: Serialize + Sized {
    /// Renders the value as a YAML document.
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be represented in YAML.
    fn to_yaml(&self) -> Result<String, YamlError> {
        serde_saphyr::to_string(self)
    }
}

impl<T: Serialize + Sized> ToYaml for T {}
