use indexmap::IndexMap;

use crate::field_value::{format_number, parse_number};
use crate::{
    CollectedValues, Field, FieldKind, FieldName, FieldValue, FormDefinition, SetValueError,
};

/// Current value of one rendered control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlState {
    /// Text held by a text input (and unrecognized kinds).
    Text(String),

    /// Text held by a number input, exactly as typed.
    Number(String),

    /// Position of a range slider.
    Range(f64),

    /// Index of the selected option, `None` when nothing is selected.
    Select(Option<usize>),

    /// Whether a checkbox is ticked.
    Checkbox(bool),
}

impl ControlState {
    /// The initial state of the control for a field, before any interaction.
    pub fn initial(field: &Field) -> Self {
        match field.kind() {
            FieldKind::Text(input) => Self::Text(input.default.clone().unwrap_or_default()),
            FieldKind::Number(input) => Self::Number(input.default.clone().unwrap_or_default()),
            FieldKind::Range(range) => Self::Range(range.initial_value()),
            FieldKind::Select(select) => Self::Select(select.initial_index()),
            FieldKind::Checkbox(checkbox) => Self::Checkbox(checkbox.default),
        }
    }

    /// The control's value as text, as a browser would report it.
    ///
    /// Range sliders report their position, selects the selected option's
    /// value (empty when nothing is selected), checkboxes `"on"`/`""`.
    pub fn text(&self, field: &Field) -> String {
        match (self, field.kind()) {
            (Self::Text(s) | Self::Number(s), _) => s.clone(),
            (Self::Range(v), _) => format_number(*v),
            (Self::Select(Some(idx)), FieldKind::Select(select)) => select
                .options
                .get(*idx)
                .map(|o| o.value.clone())
                .unwrap_or_default(),
            (Self::Select(_), _) => String::new(),
            (Self::Checkbox(checked), _) => if *checked { "on" } else { "" }.to_string(),
        }
    }

    /// Coerce the control's value for collection.
    ///
    /// Checkboxes yield their checked state, number and range controls a
    /// number (empty is `0`), everything else the raw text.
    pub fn coerce(&self, field: &Field) -> FieldValue {
        match self {
            Self::Checkbox(checked) => FieldValue::Bool(*checked),
            Self::Range(v) => FieldValue::Number(*v),
            _ if field.kind().is_numeric() => FieldValue::Number(parse_number(&self.text(field))),
            _ => FieldValue::String(self.text(field)),
        }
    }
}

/// A native constraint violated by the current value of a control.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// The offending field.
    pub name: FieldName,

    /// Human-readable description.
    pub message: String,
}

/// The authoritative current values of all rendered controls.
///
/// Backends paint their controls from this state on first render and write
/// every user change back into it. The values submitted are read from here,
/// never from the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    controls: IndexMap<FieldName, ControlState>,
}

impl FormState {
    /// Create the initial state for all fields of a form.
    pub fn new(definition: &FormDefinition) -> Self {
        Self::from_fields(definition.fields())
    }

    /// Create the initial state for the given fields.
    pub fn from_fields(fields: &[Field]) -> Self {
        Self {
            controls: fields
                .iter()
                .map(|f| (f.name().clone(), ControlState::initial(f)))
                .collect(),
        }
    }

    /// Get the state of a control.
    pub fn get(&self, name: &str) -> Option<&ControlState> {
        self.controls.get(name)
    }

    /// Get a mutable reference to the state of a control.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ControlState> {
        self.controls.get_mut(name)
    }

    /// Replace the state of a control. Unknown names are ignored.
    pub fn set(&mut self, name: &str, state: ControlState) -> bool {
        match self.controls.get_mut(name) {
            Some(slot) => {
                *slot = state;
                true
            }
            None => false,
        }
    }

    /// Remove a control, as if it had never been rendered.
    pub fn remove(&mut self, name: &str) -> Option<ControlState> {
        self.controls.shift_remove(name)
    }

    /// Set a control from user-entered text, interpreted according to the field kind.
    ///
    /// Range values are clamped and snapped; select values pick the option
    /// with that value, or its label; checkbox text is read as a flag
    /// (`true/false`, `on/off`, `yes/no`, `1/0`).
    pub fn set_text(&mut self, field: &Field, text: &str) -> Result<(), SetValueError> {
        let state = match field.kind() {
            FieldKind::Text(_) => ControlState::Text(text.to_string()),
            FieldKind::Number(_) => ControlState::Number(text.to_string()),
            FieldKind::Range(range) => ControlState::Range(range.sanitize(parse_number(text))),
            FieldKind::Select(select) => {
                let idx = select
                    .options
                    .iter()
                    .position(|o| o.value == text)
                    .or_else(|| select.options.iter().position(|o| o.label == text))
                    .ok_or_else(|| SetValueError::NotAnOption {
                        name: field.name().to_string(),
                        value: text.to_string(),
                    })?;
                ControlState::Select(Some(idx))
            }
            FieldKind::Checkbox(_) => {
                ControlState::Checkbox(match text.trim().to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" | "" => false,
                    other => return Err(SetValueError::BadCheckboxState(other.to_string())),
                })
            }
        };
        if self.set(field.name().as_str(), state) {
            Ok(())
        } else {
            Err(SetValueError::UnknownField(field.name().to_string()))
        }
    }

    /// Read every rendered control back into a name-keyed snapshot.
    ///
    /// Fields whose control cannot be found are skipped without error.
    pub fn collect(&self, fields: &[Field]) -> CollectedValues {
        let mut values = CollectedValues::new();
        for field in fields {
            let Some(control) = self.controls.get(field.name().as_str()) else {
                continue;
            };
            values.insert(field.name().clone(), control.coerce(field));
        }
        values
    }

    /// Check the native input constraints: `required` on text, number and
    /// select controls, `min`/`max` and numeric syntax on number inputs.
    pub fn violations(&self, fields: &[Field]) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();
        for field in fields {
            let Some(control) = self.controls.get(field.name().as_str()) else {
                continue;
            };
            if let Some(message) = violation(field, control) {
                violations.push(ConstraintViolation {
                    name: field.name().clone(),
                    message,
                });
            }
        }
        violations
    }

    /// Get an iterator over all controls, in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &ControlState)> {
        self.controls.iter()
    }

    /// Get the number of controls.
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Check if there are no controls.
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

fn violation(field: &Field, control: &ControlState) -> Option<String> {
    let text = control.text(field);
    let requires_value = matches!(
        field.kind(),
        FieldKind::Text(_) | FieldKind::Number(_) | FieldKind::Select(_)
    );
    if field.required() && requires_value && text.is_empty() {
        return Some("Please fill out this field.".to_string());
    }
    let FieldKind::Number(input) = field.kind() else {
        return None;
    };
    if text.trim().is_empty() {
        return None;
    }
    let n = parse_number(&text);
    if n.is_nan() {
        return Some("Please enter a number.".to_string());
    }
    if let Some(min) = input.min
        && n < min
    {
        return Some(format!(
            "Value must be greater than or equal to {}.",
            format_number(min)
        ));
    }
    if let Some(max) = input.max
        && n > max
    {
        return Some(format!(
            "Value must be less than or equal to {}.",
            format_number(max)
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{CheckboxField, InputField, RangeField, SelectField, SelectOption};

    fn fields() -> Vec<Field> {
        vec![
            Field::new("who", FieldKind::Text(InputField::new())),
            Field::new("hours", FieldKind::Number(InputField::with_bounds(Some(1.0), Some(40.0)))),
            Field::new("level", FieldKind::Range(RangeField::new(0.0, 10.0).with_default(4.0))),
            Field::new(
                "plan",
                FieldKind::Select(SelectField::new(vec![
                    SelectOption::new("basic", "Basic"),
                    SelectOption::new("pro", "Pro"),
                ])),
            ),
            Field::new("rush", FieldKind::Checkbox(CheckboxField::new())),
        ]
    }

    #[test]
    fn initial_collection() {
        let fields = fields();
        let state = FormState::from_fields(&fields);
        let values = state.collect(&fields);

        assert_eq!(values.get_string("who").unwrap(), "");
        assert_eq!(values.get_number("hours").unwrap(), 0.0);
        assert_eq!(values.get_number("level").unwrap(), 4.0);
        assert_eq!(values.get_string("plan").unwrap(), "basic");
        assert!(!values.get_bool("rush").unwrap());
    }

    #[test]
    fn checkbox_default_true_collects_true() {
        let fields = vec![Field::new(
            "rush",
            FieldKind::Checkbox(CheckboxField::with_default(true)),
        )];
        let state = FormState::from_fields(&fields);
        assert!(state.collect(&fields).get_bool("rush").unwrap());
    }

    #[test]
    fn missing_controls_are_skipped() {
        let fields = fields();
        let mut state = FormState::from_fields(&fields);
        state.remove("plan");

        let values = state.collect(&fields);
        assert_eq!(values.len(), 4);
        assert!(!values.contains("plan"));
    }

    #[test]
    fn set_text_by_kind() {
        let fields = fields();
        let mut state = FormState::from_fields(&fields);

        state.set_text(&fields[1], "12").unwrap();
        state.set_text(&fields[2], "99").unwrap();
        state.set_text(&fields[3], "Pro").unwrap();
        state.set_text(&fields[4], "yes").unwrap();

        let values = state.collect(&fields);
        assert_eq!(values.get_number("hours").unwrap(), 12.0);
        assert_eq!(values.get_number("level").unwrap(), 10.0);
        assert_eq!(values.get_string("plan").unwrap(), "pro");
        assert!(values.get_bool("rush").unwrap());

        assert_eq!(
            state.set_text(&fields[3], "enterprise"),
            Err(SetValueError::NotAnOption {
                name: "plan".to_string(),
                value: "enterprise".to_string(),
            })
        );
        assert_eq!(
            state.set_text(&fields[4], "Maybe"),
            Err(SetValueError::BadCheckboxState("maybe".to_string()))
        );
    }

    #[test]
    fn non_numeric_number_collects_nan() {
        let fields = fields();
        let mut state = FormState::from_fields(&fields);
        state.set_text(&fields[1], "lots").unwrap();

        let values = state.collect(&fields);
        assert!(values.get_number("hours").unwrap().is_nan());
    }

    #[test]
    fn violations_for_native_constraints() {
        let fields = vec![
            Field::new("who", FieldKind::Text(InputField::new())).with_required(true),
            Field::new("hours", FieldKind::Number(InputField::with_bounds(Some(1.0), Some(40.0)))),
        ];
        let mut state = FormState::from_fields(&fields);
        state.set_text(&fields[1], "50").unwrap();

        let violations = state.violations(&fields);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].name.as_str(), "who");
        assert_eq!(
            violations[1].message,
            "Value must be less than or equal to 40."
        );

        state.set_text(&fields[0], "Ann").unwrap();
        state.set_text(&fields[1], "").unwrap();
        assert!(state.violations(&fields).is_empty());
    }
}
