use serde::de::DeserializeOwned;

use crate::error::SchemaError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, SchemaError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_schema_error)
}

/// Same as [`from_str_with_path`] for an already parsed value.
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, SchemaError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(into_schema_error)
}

fn into_schema_error<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> SchemaError {
    SchemaError::Parse {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    }
}
