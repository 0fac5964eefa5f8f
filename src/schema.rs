//! Structural validation of host-supplied values.
//!
//! The bus client never interprets response or render-data payloads itself.
//! Callers hand it a [`Schema`] that turns a raw JSON value into a typed value
//! or a [`ValidationError`] describing what did not match.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;

/// Validator detail for a value that did not match its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A structural schema for JSON values.
pub trait Schema {
    type Output;

    fn validate(&self, value: Value) -> Result<Self::Output, ValidationError>;
}

impl<S: Schema + ?Sized> Schema for &S {
    type Output = S::Output;

    fn validate(&self, value: Value) -> Result<Self::Output, ValidationError> {
        (**self).validate(value)
    }
}

/// Schema backed by a type's `Deserialize` implementation.
pub struct Json<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Json<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Json<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Json<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> Schema for Json<T> {
    type Output = T;

    fn validate(&self, value: Value) -> Result<T, ValidationError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Schema from a plain validation function.
pub struct FnSchema<F> {
    validate: F,
}

impl<F, T> FnSchema<F>
where
    F: Fn(Value) -> Result<T, ValidationError>,
{
    pub fn new(validate: F) -> Self {
        Self { validate }
    }
}

impl<F, T> Schema for FnSchema<F>
where
    F: Fn(Value) -> Result<T, ValidationError>,
{
    type Output = T;

    fn validate(&self, value: Value) -> Result<T, ValidationError> {
        (self.validate)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_json_schema_accepts_matching_value() {
        let schema = Json::<Point>::new();
        let point = schema.validate(json!({ "x": 1, "y": 2 })).unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[test]
    fn test_json_schema_reports_detail() {
        let schema = Json::<Point>::new();
        let err = schema.validate(json!({ "x": 1 })).unwrap_err();
        assert!(err.message.contains("missing field `y`"), "{}", err.message);
    }

    #[test]
    fn test_fn_schema() {
        let schema = FnSchema::new(|value: Value| {
            value
                .as_str()
                .map(str::to_uppercase)
                .ok_or_else(|| ValidationError::new("expected a string"))
        });
        assert_eq!(schema.validate(json!("abc")).unwrap(), "ABC");
        assert_eq!(
            schema.validate(json!(3)).unwrap_err().to_string(),
            "expected a string"
        );
    }

    #[test]
    fn test_schema_by_reference() {
        let schema = Json::<Point>::new();
        let by_ref = &schema;
        assert!(by_ref.validate(json!({ "x": 0, "y": 0 })).is_ok());
    }
}
