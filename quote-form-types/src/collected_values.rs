use indexmap::IndexMap;
use serde::Serialize;

use crate::{FieldName, FieldValue};

/// Error type for typed access to collected values.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Missing value for field: {0}")]
    MissingField(FieldName),

    #[error("Type mismatch at field '{name}': expected {expected}, got {actual}")]
    TypeMismatch {
        name: FieldName,
        expected: &'static str,
        actual: &'static str,
    },
}

/// The coerced, name-keyed snapshot of user input taken at submit time.
///
/// Entries keep the order in which fields were declared, so the pretty-printed
/// dump lists them exactly as the form shows them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CollectedValues {
    values: IndexMap<FieldName, FieldValue>,
}

impl CollectedValues {
    /// Create a new empty collection.
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Insert a value for the given field. Re-inserting keeps the original position.
    pub fn insert(&mut self, name: impl Into<FieldName>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Get the value of a field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Check if a value exists for the given field.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Get an iterator over all name-value pairs, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.values.iter()
    }

    /// Get the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pretty-print the values as JSON with 2-space indentation.
    pub fn to_pretty_json(&self) -> String {
        // Keys are strings and values are scalars; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    // === Convenience accessors ===

    /// Get a string value for the given field.
    pub fn get_string(&self, name: &str) -> Result<&str, CollectError> {
        match self.get(name) {
            Some(FieldValue::String(s)) => Ok(s),
            Some(other) => Err(CollectError::TypeMismatch {
                name: name.into(),
                expected: "String",
                actual: other.type_name(),
            }),
            None => Err(CollectError::MissingField(name.into())),
        }
    }

    /// Get a numeric value for the given field.
    pub fn get_number(&self, name: &str) -> Result<f64, CollectError> {
        match self.get(name) {
            Some(FieldValue::Number(n)) => Ok(*n),
            Some(other) => Err(CollectError::TypeMismatch {
                name: name.into(),
                expected: "Number",
                actual: other.type_name(),
            }),
            None => Err(CollectError::MissingField(name.into())),
        }
    }

    /// Get a boolean value for the given field.
    pub fn get_bool(&self, name: &str) -> Result<bool, CollectError> {
        match self.get(name) {
            Some(FieldValue::Bool(b)) => Ok(*b),
            Some(other) => Err(CollectError::TypeMismatch {
                name: name.into(),
                expected: "Bool",
                actual: other.type_name(),
            }),
            None => Err(CollectError::MissingField(name.into())),
        }
    }
}

impl IntoIterator for CollectedValues {
    type Item = (FieldName, FieldValue);
    type IntoIter = indexmap::map::IntoIter<FieldName, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a CollectedValues {
    type Item = (&'a FieldName, &'a FieldValue);
    type IntoIter = indexmap::map::Iter<'a, FieldName, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn insert_and_get() {
        let mut values = CollectedValues::new();
        values.insert("name", "Alice");
        values.insert("hours", 30);

        assert_eq!(values.get_string("name").unwrap(), "Alice");
        assert_eq!(values.get_number("hours").unwrap(), 30.0);
    }

    #[test]
    fn keeps_declaration_order() {
        let mut values = CollectedValues::new();
        values.insert("zeta", 1);
        values.insert("alpha", 2);
        values.insert("mid", true);

        let names: Vec<_> = values.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn pretty_json_uses_two_spaces() {
        let mut values = CollectedValues::new();
        values.insert("b", 3);
        values.insert("a", "x");
        values.insert("ok", false);

        assert_eq!(
            values.to_pretty_json(),
            "{\n  \"b\": 3,\n  \"a\": \"x\",\n  \"ok\": false\n}"
        );
    }

    #[test]
    fn empty_dump() {
        assert_eq!(CollectedValues::new().to_pretty_json(), "{}");
    }

    #[test]
    fn type_mismatch_error() {
        let mut values = CollectedValues::new();
        values.insert("hours", 30);

        let result = values.get_string("hours");
        assert!(matches!(result, Err(CollectError::TypeMismatch { .. })));

        let result = values.get_bool("missing");
        assert!(matches!(result, Err(CollectError::MissingField(_))));
    }
}
