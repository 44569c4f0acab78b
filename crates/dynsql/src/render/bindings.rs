//! Ordered parameter bindings produced by a render.

use crate::error::{SqlError, SqlResult};
use crate::value::{SqlType, Value};
use serde::Serialize;
use std::collections::HashMap;

/// One bound parameter: key, value, and the type tag of the column it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterBinding {
    pub key: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_type: Option<SqlType>,
}

impl ParameterBinding {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            sql_type: None,
        }
    }

    pub fn with_type(mut self, sql_type: Option<SqlType>) -> Self {
        self.sql_type = sql_type;
        self
    }
}

/// Bindings in placeholder order, with a key lookup for named consumers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterBindings {
    bindings: Vec<ParameterBinding>,
    index: HashMap<String, usize>,
}

impl ParameterBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding and return its 1-based position.
    ///
    /// Keys are unique within one statement.
    pub fn push(&mut self, binding: ParameterBinding) -> SqlResult<usize> {
        if self.index.contains_key(&binding.key) {
            return Err(SqlError::DuplicateParameterKey(binding.key));
        }
        self.index.insert(binding.key.clone(), self.bindings.len());
        self.bindings.push(binding);
        Ok(self.bindings.len())
    }

    /// Append every binding of `other`, keeping its order.
    pub fn extend(&mut self, other: ParameterBindings) -> SqlResult<()> {
        for binding in other.bindings {
            self.push(binding)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterBinding> {
        self.bindings.iter()
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.bindings[i].value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Values in placeholder order, for positional consumers.
    pub fn values(&self) -> Vec<&Value> {
        self.bindings.iter().map(|b| &b.value).collect()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.key.as_str()).collect()
    }

    /// Key → value map view.
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.bindings
            .iter()
            .map(|b| (b.key.clone(), b.value.clone()))
            .collect()
    }

    /// JSON object keyed by binding key.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .bindings
            .iter()
            .map(|b| {
                let value = serde_json::to_value(&b.value).unwrap_or(serde_json::Value::Null);
                (b.key.clone(), value)
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    pub fn into_vec(self) -> Vec<ParameterBinding> {
        self.bindings
    }
}

impl<'a> IntoIterator for &'a ParameterBindings {
    type Item = &'a ParameterBinding;
    type IntoIter = std::slice::Iter<'a, ParameterBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

impl IntoIterator for ParameterBindings {
    type Item = ParameterBinding;
    type IntoIter = std::vec::IntoIter<ParameterBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_position() {
        let mut pb = ParameterBindings::new();
        assert_eq!(pb.push(ParameterBinding::new("p1", 1)).unwrap(), 1);
        assert_eq!(pb.push(ParameterBinding::new("p2", "x")).unwrap(), 2);
        assert_eq!(pb.keys(), vec!["p1", "p2"]);
        assert_eq!(pb.get("p2"), Some(&Value::from("x")));
        assert_eq!(pb.get("p3"), None);
    }

    #[test]
    fn test_push_duplicate() {
        let mut pb = ParameterBindings::new();
        pb.push(ParameterBinding::new("1", 1)).unwrap();
        let err = pb.push(ParameterBinding::new("1", 2)).unwrap_err();
        assert_eq!(err.code(), "duplicate_parameter_key");
        assert_eq!(pb.len(), 1);
        assert_eq!(pb.get("1"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_map_and_json_views() {
        let mut pb = ParameterBindings::new();
        pb.push(ParameterBinding::new("p1", 20).with_type(Some(SqlType::Integer)))
            .unwrap();
        pb.push(ParameterBinding::new("p2", Value::Null)).unwrap();

        let map = pb.to_map();
        assert_eq!(map.get("p1"), Some(&Value::Int(20)));
        assert_eq!(pb.to_json(), serde_json::json!({"p1": 20, "p2": null}));
    }

    #[test]
    fn test_binding_serializes_type_tag() {
        let b = ParameterBinding::new("p1", 20).with_type(Some(SqlType::Integer));
        assert_eq!(
            serde_json::to_value(&b).unwrap(),
            serde_json::json!({"key": "p1", "value": 20, "sql_type": "INTEGER"})
        );
        let b = ParameterBinding::new("p1", 20);
        assert_eq!(
            serde_json::to_value(&b).unwrap(),
            serde_json::json!({"key": "p1", "value": 20})
        );
    }
}
