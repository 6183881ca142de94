use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

/// The name of a field, e.g. `"hours"`.
///
/// Used as the control identifier in every backend and as the key in
/// `CollectedValues`. A normalized form never contains an empty or duplicate
/// name: missing names are generated, repeated names are suffixed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FieldName {
    name: String,
}

impl FieldName {
    /// Create a new field name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Generate a fresh, random name for a field that declares neither
    /// `name` nor `id`.
    pub fn generated() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// Pick the name for a declared field: `name`, else `id`, else a generated one.
    ///
    /// Empty strings count as absent.
    pub fn resolve(name: Option<&str>, id: Option<&str>) -> Self {
        name.filter(|n| !n.is_empty())
            .or_else(|| id.filter(|i| !i.is_empty()))
            .map(Self::new)
            .unwrap_or_else(Self::generated)
    }

    /// Append a numeric suffix, used to break ties between repeated names.
    pub fn with_suffix(&self, n: usize) -> Self {
        Self::new(format!("{}_{n}", self.name))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Id of the live readout element that accompanies a range control.
    pub fn readout_id(&self) -> String {
        format!("{}_out", self.name)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl From<&str> for FieldName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FieldName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for FieldName {
    fn from(s: &String) -> Self {
        Self::new(s.clone())
    }
}
