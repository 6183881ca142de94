//! Test backend for running forms without user interaction.
//!
//! `TestBackend` plays a scripted user: it types pre-defined text into
//! controls, then presses submit a given number of times.
//!
//! # Example
//!
//! ```rust
//! use quote_form::{Form, FormConfig, TestBackend};
//!
//! let config = FormConfig::from_json(
//!     r#"{"fields": [{"name": "hours", "type": "number"}],
//!         "totalExpression": "values.hours * 40"}"#,
//! )
//! .unwrap();
//! let mut form = Form::assemble(&config);
//!
//! form.run(&TestBackend::new().with_text("hours", "3")).unwrap();
//!
//! let presentation = form.phase().presentation().unwrap();
//! assert!(presentation.values_dump.contains("\"hours\": 3"));
//! ```

use quote_form_types::{
    FormBackend, FormDefinition, FormError, FormState, SetValueError, SubmitHandler,
};

/// A backend that fills controls from pre-configured text and submits.
#[derive(Debug, Clone)]
pub struct TestBackend {
    inputs: Vec<(String, String)>,
    submits: usize,
    enforce_constraints: bool,
}

/// Error type for TestBackend.
#[derive(Debug, thiserror::Error)]
pub enum TestBackendError {
    #[error("No field named '{0}'")]
    UnknownField(String),

    #[error("Invalid input for '{name}': {source}")]
    InvalidInput {
        name: String,
        #[source]
        source: SetValueError,
    },

    #[error("Constraint violated for '{name}': {message}")]
    ConstraintViolated { name: String, message: String },

    #[error(transparent)]
    Submit(#[from] FormError),
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    /// Create a backend that changes nothing and submits once.
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            submits: 1,
            enforce_constraints: false,
        }
    }

    /// Type text into a control before submitting.
    ///
    /// The text is interpreted according to the field kind, as
    /// [`FormState::set_text`] does.
    pub fn with_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.inputs.push((name.into(), text.into()));
        self
    }

    /// Set how many times submit is pressed (zero leaves the form unsubmitted).
    pub fn with_submits(mut self, submits: usize) -> Self {
        self.submits = submits;
        self
    }

    /// Refuse to submit while native constraints are violated, as a browser does.
    pub fn with_constraints(mut self, enforce: bool) -> Self {
        self.enforce_constraints = enforce;
        self
    }
}

impl FormBackend for TestBackend {
    type Error = TestBackendError;

    fn run(
        &self,
        definition: &FormDefinition,
        mut state: FormState,
        submit: &mut SubmitHandler<'_>,
    ) -> Result<FormState, Self::Error> {
        for (name, text) in &self.inputs {
            let field = definition
                .field(name)
                .ok_or_else(|| TestBackendError::UnknownField(name.clone()))?;
            state
                .set_text(field, text)
                .map_err(|source| TestBackendError::InvalidInput {
                    name: name.clone(),
                    source,
                })?;
        }

        if self.enforce_constraints
            && let Some(violation) = state.violations(definition.fields()).into_iter().next()
        {
            return Err(TestBackendError::ConstraintViolated {
                name: violation.name.to_string(),
                message: violation.message,
            });
        }

        for _ in 0..self.submits {
            submit(&state)?;
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quote_form_types::{CheckboxField, Field, FieldKind, InputField, Presentation};

    use super::*;

    fn definition() -> FormDefinition {
        FormDefinition::new(vec![
            Field::new("who", FieldKind::Text(InputField::new())).with_required(true),
            Field::new("hours", FieldKind::Number(InputField::new())),
            Field::new("rush", FieldKind::Checkbox(CheckboxField::new())),
        ])
    }

    fn run(backend: &TestBackend) -> (Result<FormState, TestBackendError>, usize) {
        let definition = definition();
        let mut calls = 0;
        let mut handler = |_: &FormState| -> Result<Presentation, FormError> {
            calls += 1;
            Ok(Presentation {
                total_line: None,
                values_dump: String::new(),
            })
        };
        let result = backend.run(&definition, FormState::new(&definition), &mut handler);
        (result, calls)
    }

    #[test]
    fn fills_and_submits() {
        let (state, calls) = run(&TestBackend::new().with_text("hours", "8").with_submits(2));
        let values = state.unwrap().collect(definition().fields());

        assert_eq!(calls, 2);
        assert_eq!(values.get_number("hours").unwrap(), 8.0);
    }

    #[test]
    fn unknown_field() {
        let (state, calls) = run(&TestBackend::new().with_text("rate", "1"));
        assert!(matches!(state, Err(TestBackendError::UnknownField(name)) if name == "rate"));
        assert_eq!(calls, 0);
    }

    #[test]
    fn invalid_input_keeps_the_cause() {
        let (state, calls) = run(&TestBackend::new().with_text("rush", "perhaps"));
        let Err(TestBackendError::InvalidInput { name, source }) = state else {
            panic!("Expected invalid input");
        };
        assert_eq!(name, "rush");
        assert_eq!(source, SetValueError::BadCheckboxState("perhaps".to_string()));
        assert_eq!(calls, 0);
    }

    #[test]
    fn constraints_block_submit() {
        let (state, calls) = run(&TestBackend::new().with_constraints(true));
        assert!(matches!(
            state,
            Err(TestBackendError::ConstraintViolated { name, .. }) if name == "who"
        ));
        assert_eq!(calls, 0);

        let (state, calls) =
            run(&TestBackend::new().with_text("who", "Ann").with_constraints(true));
        assert!(state.is_ok());
        assert_eq!(calls, 1);
    }
}
