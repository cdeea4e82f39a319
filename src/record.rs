//! Diagnostic info records attached to environment transitions.
use crate::error::CollectError;
use std::collections::{
    hash_map::{Iter, Keys},
    HashMap,
};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value.
    Scalar(f32),

    /// A boolean flag.
    Bool(bool),

    /// A 1-dimensional array of floating-point values.
    Array1(Vec<f32>),

    /// A text value.
    String(String),
}

/// A container of string-keyed values of various data types.
///
/// Environments report per-step diagnostics through a [`Record`]; step-data
/// processors extend it with derived fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, CollectError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(CollectError::RecordValueTypeError("Scalar".to_string())),
            None => Err(CollectError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a boolean flag from the record.
    pub fn get_bool(&self, k: &str) -> Result<bool, CollectError> {
        match self.0.get(k) {
            Some(RecordValue::Bool(v)) => Ok(*v),
            Some(_) => Err(CollectError::RecordValueTypeError("Bool".to_string())),
            None => Err(CollectError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 1-dimensional array from the record.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, CollectError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(CollectError::RecordValueTypeError("Array1".to_string())),
            None => Err(CollectError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, CollectError> {
        match self.0.get(k) {
            Some(RecordValue::String(v)) => Ok(v.clone()),
            Some(_) => Err(CollectError::RecordValueTypeError("String".to_string())),
            None => Err(CollectError::RecordKeyError(k.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_access() {
        let mut record = Record::empty();
        record.insert("success", RecordValue::Bool(true));
        record.insert("qpos", RecordValue::Array1(vec![1.0, 2.0]));
        record.insert("reward", RecordValue::Scalar(-1.0));

        assert!(record.get_bool("success").unwrap());
        assert_eq!(record.get_array1("qpos").unwrap(), vec![1.0, 2.0]);
        assert_eq!(record.get_scalar("reward").unwrap(), -1.0);
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let record = Record::from_slice(&[("success", RecordValue::Bool(false))]);
        assert!(matches!(
            record.get_scalar("success"),
            Err(CollectError::RecordValueTypeError(_))
        ));
    }

    #[test]
    fn missing_key_is_an_error() {
        let record = Record::empty();
        assert!(matches!(
            record.get_bool("success"),
            Err(CollectError::RecordKeyError(_))
        ));
    }
}
