use serde_json::Value;

use crate::FieldName;
use crate::field_value::{format_number, parse_number};

/// A single normalized field of a form.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// The unique name of this field; control identifier and collected-values key.
    name: FieldName,

    /// The label text shown next to the control.
    label: String,

    /// Optional secondary text shown beneath or alongside the control.
    hint: Option<String>,

    /// Whether the control is marked as mandatory.
    required: bool,

    /// The kind of field (determines control type and coercion).
    kind: FieldKind,
}

impl Field {
    /// Create a new field. The label defaults to the name.
    pub fn new(name: impl Into<FieldName>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            label: name.to_string(),
            name,
            hint: None,
            required: false,
            kind,
        }
    }

    /// Set the label text.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the hint text. Empty hints are dropped.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.hint = (!hint.is_empty()).then_some(hint);
        self
    }

    /// Mark the field as required (or not).
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Get the field name.
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// Get the label text.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the hint text, if any.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Whether the control is mandatory.
    pub fn required(&self) -> bool {
        self.required
    }

    /// Get the field kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

/// The kind of field, determining control type and value coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Single-line text input. Also used for unrecognized types.
    Text(InputField),

    /// Numeric input.
    Number(InputField),

    /// Slider with a live readout of its value.
    Range(RangeField),

    /// Choice from a list of options.
    Select(SelectField),

    /// On/off toggle.
    Checkbox(CheckboxField),
}

impl FieldKind {
    /// Short type name as used in the configuration and as the HTML input type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Range(_) => "range",
            Self::Select(_) => "select",
            Self::Checkbox(_) => "checkbox",
        }
    }

    /// Whether values of this kind are collected as numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Range(_))
    }
}

/// Configuration for a text or number input.
///
/// Constraint attributes that were not declared stay `None` and are not
/// rendered at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputField {
    /// Optional minimum value.
    pub min: Option<f64>,

    /// Optional maximum value.
    pub max: Option<f64>,

    /// Optional step granularity.
    pub step: Option<f64>,

    /// Optional placeholder text.
    pub placeholder: Option<String>,

    /// Optional initial value.
    pub default: Option<String>,
}

impl InputField {
    /// Create a new input with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with bounds.
    pub fn with_bounds(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min,
            max,
            ..Self::default()
        }
    }

    /// Create with an initial value.
    pub fn with_default(default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
            ..Self::default()
        }
    }
}

/// Configuration for a range slider.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeField {
    /// Lower bound (default 0).
    pub min: f64,

    /// Upper bound (default 100).
    pub max: f64,

    /// Step granularity (default 1).
    pub step: f64,

    /// Declared initial value. `None` when absent or not a number.
    pub default: Option<f64>,

    /// Whether an initial value was declared at all.
    pub has_default: bool,
}

impl Default for RangeField {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            default: None,
            has_default: false,
        }
    }
}

impl RangeField {
    /// Create a range with the given bounds and step of 1.
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            ..Self::default()
        }
    }

    /// Set the step.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Set the declared initial value.
    pub fn with_default(mut self, default: f64) -> Self {
        self.default = Some(default);
        self.has_default = true;
        self
    }

    /// Effective upper bound: a maximum below the minimum collapses to the minimum.
    pub fn effective_max(&self) -> f64 {
        if self.max < self.min { self.min } else { self.max }
    }

    /// Effective step: non-positive or non-finite steps fall back to 1.
    pub fn effective_step(&self) -> f64 {
        if self.step.is_finite() && self.step > 0.0 {
            self.step
        } else {
            1.0
        }
    }

    /// The value the slider starts at.
    ///
    /// A declared default wins, else the minimum. A declared default that is
    /// not a number falls back to the midpoint of the range.
    pub fn initial_value(&self) -> f64 {
        let raw = match (self.default, self.has_default) {
            (Some(v), _) => v,
            (None, true) => self.min + (self.effective_max() - self.min) / 2.0,
            (None, false) => self.min,
        };
        self.sanitize(raw)
    }

    /// Clamp a value into `[min, max]` and snap it onto the step grid anchored at `min`.
    pub fn sanitize(&self, value: f64) -> f64 {
        let max = self.effective_max();
        let step = self.effective_step();
        if !value.is_finite() {
            return self.min;
        }
        let clamped = value.clamp(self.min, max);
        let steps = ((clamped - self.min) / step).round();
        let mut snapped = self.min + steps * step;
        if snapped > max {
            snapped -= step;
        }
        // Keep the decimal noise of repeated additions out of the readout.
        let scale = 10f64.powi(decimals(step).max(decimals(self.min)) as i32);
        (snapped * scale).round() / scale
    }

    /// Move the value by `delta` steps, staying in range.
    pub fn nudge(&self, value: f64, delta: i32) -> f64 {
        self.sanitize(value + f64::from(delta) * self.effective_step())
    }
}

fn decimals(n: f64) -> usize {
    // Plain positional digits, never exponent form.
    let text = n.to_string();
    text.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
}

/// A single option of a select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// The submitted value.
    pub value: String,

    /// The text shown to the user.
    pub label: String,
}

impl SelectOption {
    /// Create a new option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Create an option whose label equals its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }

    /// Normalize the `options` of a field declaration.
    ///
    /// Accepts an array of `{value, label}` objects (label defaults to the
    /// value), an array of plain strings or numbers (value equals label), or a
    /// map from value to label. Anything else yields no options.
    pub fn normalize_list(options: Option<&Value>) -> Vec<SelectOption> {
        match options {
            Some(Value::Array(items)) => items.iter().filter_map(Self::from_item).collect(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(value, label)| Self::new(value.clone(), js_string(label)))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn from_item(item: &Value) -> Option<SelectOption> {
        match item {
            Value::String(s) => Some(Self::plain(s.clone())),
            Value::Number(_) | Value::Bool(_) => Some(Self::plain(js_string(item))),
            Value::Object(obj) => {
                let value = obj.get("value").filter(|v| !v.is_null()).map(js_string);
                let label = obj.get("label").filter(|v| !v.is_null()).map(js_string);
                match (value, label) {
                    (Some(value), Some(label)) => Some(Self::new(value, label)),
                    (Some(value), None) => Some(Self::plain(value)),
                    (None, Some(label)) => Some(Self::plain(label)),
                    (None, None) => None,
                }
            }
            Value::Null | Value::Array(_) => None,
        }
    }
}

/// Configuration for a select field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectField {
    /// The available options, in declaration order.
    pub options: Vec<SelectOption>,

    /// Optional value to pre-select.
    pub default: Option<String>,
}

impl SelectField {
    /// Create a new select with the given options.
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self {
            options,
            default: None,
        }
    }

    /// Create with a value to pre-select.
    pub fn with_default(options: Vec<SelectOption>, default: impl Into<String>) -> Self {
        Self {
            options,
            default: Some(default.into()),
        }
    }

    /// Index of the option selected before any interaction.
    ///
    /// A declared default selects the matching option, or nothing when no
    /// option matches. Without a default the first option is selected.
    pub fn initial_index(&self) -> Option<usize> {
        match &self.default {
            Some(default) => self.options.iter().position(|o| &o.value == default),
            None => (!self.options.is_empty()).then_some(0),
        }
    }
}

/// Configuration for a checkbox field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckboxField {
    /// Whether the box starts checked.
    pub default: bool,
}

impl CheckboxField {
    /// Create a new checkbox, unchecked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a default state.
    pub fn with_default(default: bool) -> Self {
        Self { default }
    }
}

/// Truthiness of a configuration value: `false`, `0`, `NaN`, `""` and `null`
/// are falsy, everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a configuration value as a browser would render it into an
/// attribute: numbers without a trailing `.0`, arrays comma-joined, `null` empty.
pub fn js_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(js_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Numeric reading of a configuration value; numeric strings are accepted.
pub fn js_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => {
            Some(parse_number(s)).filter(|n| !n.is_nan())
        }
        _ => None,
    }
}
