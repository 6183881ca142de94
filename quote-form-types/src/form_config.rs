use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::field::{is_truthy, js_number, js_string};
use crate::{
    CheckboxField, Field, FieldKind, FieldName, InputField, RangeField, SelectField, SelectOption,
};

/// Title used when the configuration does not declare one.
pub const DEFAULT_TITLE: &str = "Quote Form";

/// Submit label used when the configuration does not declare one.
pub const DEFAULT_SUBMIT_LABEL: &str = "Calculate";

/// Currency code used when the configuration does not declare one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// The form description as it appears in `formConfig.json`.
///
/// Every key is optional; `fields` defaults to an empty list. Call
/// [`FormConfig::normalize`] to get a [`FormDefinition`] with all defaults
/// applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient_fields")]
    pub fields: Vec<FieldSpec>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub total_expression: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub formula: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub currency: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub submit_label: Option<String>,
}

/// One field declaration as it appears in `formConfig.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldSpec {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub hint: Option<String>,

    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,

    #[serde(default)]
    pub required: Option<Value>,

    #[serde(default)]
    pub min: Option<Value>,

    #[serde(default)]
    pub max: Option<Value>,

    #[serde(default)]
    pub step: Option<Value>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub placeholder: Option<String>,

    #[serde(default)]
    pub default: Option<Value>,

    #[serde(default)]
    pub options: Option<Value>,
}

impl FieldSpec {
    /// Normalize this declaration into a field with the given name.
    ///
    /// Unknown or missing types become text inputs. Properties that do not
    /// apply to the resulting kind (e.g. `options` on a number) are ignored.
    pub fn to_field(&self, name: FieldName) -> Field {
        let kind = match self.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("select") => FieldKind::Select(SelectField {
                options: SelectOption::normalize_list(self.options.as_ref()),
                default: self.default.as_ref().map(js_string),
            }),
            Some("number") => FieldKind::Number(InputField {
                default: self
                    .default
                    .as_ref()
                    .map(js_string)
                    .filter(|d| js_number(&Value::String(d.clone())).is_some()),
                ..self.input_field()
            }),
            Some("range") => {
                let min = self.min.as_ref().and_then(js_number).unwrap_or(0.0);
                let default = self.default.as_ref().filter(|d| !d.is_null());
                FieldKind::Range(RangeField {
                    min,
                    max: self.max.as_ref().and_then(js_number).unwrap_or(100.0),
                    step: self.step.as_ref().and_then(js_number).unwrap_or(1.0),
                    default: default.and_then(js_number),
                    has_default: default.is_some(),
                })
            }
            Some("checkbox") => FieldKind::Checkbox(CheckboxField {
                default: self.default.as_ref().is_some_and(is_truthy),
            }),
            _ => FieldKind::Text(InputField {
                default: self.default.as_ref().map(js_string),
                ..self.input_field()
            }),
        };

        let label = self
            .label
            .clone()
            .unwrap_or_else(|| name.as_str().to_string());
        let mut field = Field::new(name, kind)
            .with_label(label)
            .with_required(self.required.as_ref().is_some_and(is_truthy));
        if let Some(hint) = &self.hint {
            field = field.with_hint(hint.clone());
        }
        field
    }

    fn input_field(&self) -> InputField {
        InputField {
            min: self.min.as_ref().and_then(js_number),
            max: self.max.as_ref().and_then(js_number),
            step: self.step.as_ref().and_then(js_number),
            placeholder: self.placeholder.clone(),
            default: None,
        }
    }
}

impl FormConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The configured formula: `totalExpression`, falling back to `formula`.
    /// Empty strings count as absent.
    pub fn expression(&self) -> Option<&str> {
        self.total_expression
            .as_deref()
            .filter(|e| !e.is_empty())
            .or_else(|| self.formula.as_deref().filter(|e| !e.is_empty()))
    }

    /// Apply all defaults once and produce the explicit form definition.
    ///
    /// Every field receives a non-empty name that is unique within the form.
    pub fn normalize(&self) -> FormDefinition {
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(self.fields.len());

        for spec in &self.fields {
            let declared = FieldName::resolve(spec.name.as_deref(), spec.id.as_deref());
            let mut name = declared.clone();
            let mut n = 2;
            while seen.contains(&name) {
                name = declared.with_suffix(n);
                n += 1;
            }
            if name != declared {
                tracing::warn!(field = %declared, renamed = %name, "duplicate field name");
            }
            seen.insert(name.clone());
            fields.push(spec.to_field(name));
        }

        FormDefinition {
            title: self
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: self.description.clone().unwrap_or_default(),
            fields,
            expression: self.expression().map(str::to_string),
            currency: self
                .currency
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            submit_label: self
                .submit_label
                .clone()
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DEFAULT_SUBMIT_LABEL.to_string()),
        }
    }
}

/// The normalized form: every default applied, every field named.
///
/// A form definition is presentation-agnostic. It can be rendered as an HTML
/// page, as a terminal form, or driven by a scripted backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefinition {
    /// Heading text.
    pub title: String,

    /// Text shown beneath the heading (may be empty).
    pub description: String,

    /// All fields, in declaration order.
    pub fields: Vec<Field>,

    /// Formula computing the total, if any.
    pub expression: Option<String>,

    /// ISO 4217 currency code used to format the total.
    pub currency: String,

    /// Label of the submit control.
    pub submit_label: String,
}

impl FormDefinition {
    /// Create a definition with the given fields and default texts.
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            fields,
            expression: None,
            currency: DEFAULT_CURRENCY.to_string(),
            submit_label: DEFAULT_SUBMIT_LABEL.to_string(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the total formula.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Set the currency code.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Get the fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name().as_str() == name)
    }

    /// Check if the form has any fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl Default for FormDefinition {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Accept strings, numbers and booleans as text; `null` is absent.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(js_string(&v)),
    })
}

/// Accept a missing or `null` field list; entries that are not objects are skipped.
fn lenient_fields<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<FieldSpec>, D::Error> {
    let value = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(value
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(_) => match serde_json::from_value::<FieldSpec>(item) {
                Ok(spec) => Some(spec),
                Err(err) => {
                    tracing::warn!(%err, "skipping unreadable field declaration");
                    None
                }
            },
            other => {
                tracing::warn!(entry = %other, "skipping field declaration that is not an object");
                None
            }
        })
        .collect())
}
