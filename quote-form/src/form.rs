//! The assembled form and its submit pipeline.

use quote_form_types::{
    CollectedValues, ConstraintViolation, FormBackend, FormConfig, FormDefinition, FormError,
    FormState, Phase, Presentation, SetValueError,
};

use crate::currency::Locale;
use crate::expr::{Value, compute_total};
use crate::presenter::present_in;

/// Title shown in place of the form when the configuration cannot be loaded.
pub const ERROR_TITLE: &str = "Error loading config";

/// A form ready to be presented: its normalized definition, the current
/// control values and whether it has been submitted.
///
/// Assembling again from a configuration yields a fresh form; nothing is
/// updated incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    definition: FormDefinition,
    state: FormState,
    phase: Phase,
    locale: Locale,
}

impl Form {
    /// Normalize a configuration into a fresh, unsubmitted form.
    pub fn assemble(config: &FormConfig) -> Self {
        let form = Self::from_definition(config.normalize());
        tracing::debug!(
            title = %form.definition.title,
            fields = form.definition.len(),
            has_total = form.definition.expression.is_some(),
            "form assembled"
        );
        form
    }

    /// Create a fresh, unsubmitted form from an already normalized definition.
    pub fn from_definition(definition: FormDefinition) -> Self {
        Self {
            state: FormState::new(&definition),
            definition,
            phase: Phase::Unsubmitted,
            locale: Locale::from_env(),
        }
    }

    /// Format totals in the given locale instead of the process locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// The normalized definition.
    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    /// The current control values.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Mutable access to the current control values.
    pub fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    /// Whether the form has been submitted, and what the result area shows.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The locale totals are formatted in.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Set a control from text, interpreted according to its field kind.
    pub fn set_value(&mut self, name: &str, text: &str) -> Result<(), SetValueError> {
        let field = self
            .definition
            .field(name)
            .ok_or_else(|| SetValueError::UnknownField(name.to_string()))?;
        self.state.set_text(field, text)
    }

    /// Read the current control values into a fresh snapshot.
    pub fn collect(&self) -> CollectedValues {
        self.state.collect(self.definition.fields())
    }

    /// Native constraints the current values violate.
    pub fn violations(&self) -> Vec<ConstraintViolation> {
        self.state.violations(self.definition.fields())
    }

    /// Evaluate the configured formula against a snapshot.
    pub fn total(&self, values: &CollectedValues) -> Option<Value> {
        compute_total(self.definition.expression.as_deref(), values)
    }

    /// Run one submit: collect, evaluate, present.
    ///
    /// Every call re-enters the submitted phase, replacing the previous
    /// presentation.
    ///
    /// # Errors
    /// `FormError::InvalidCurrency` when a total exists and the configured
    /// currency is unusable. The phase is left unchanged in that case.
    pub fn submit(&mut self) -> Result<Presentation, FormError> {
        let presentation = submit_state(&self.definition, &self.state, &self.locale)?;
        self.phase = Phase::Submitted(presentation.clone());
        Ok(presentation)
    }

    /// Hand the form to a backend until the user leaves it.
    ///
    /// The backend calls back into the submit pipeline on every submit. The
    /// final control values and the latest presentation are kept.
    pub fn run<B: FormBackend>(&mut self, backend: &B) -> anyhow::Result<()> {
        let Self {
            definition,
            state,
            phase,
            locale,
        } = self;

        let mut handler = |current: &FormState| -> Result<Presentation, FormError> {
            let presentation = submit_state(definition, current, locale)?;
            *phase = Phase::Submitted(presentation.clone());
            Ok(presentation)
        };
        let final_state = backend
            .run(definition, state.clone(), &mut handler)
            .map_err(Into::<anyhow::Error>::into)?;
        *state = final_state;
        Ok(())
    }
}

/// The submit pipeline over a given state.
pub fn submit_state(
    definition: &FormDefinition,
    state: &FormState,
    locale: &Locale,
) -> Result<Presentation, FormError> {
    let values = state.collect(definition.fields());
    let total = compute_total(definition.expression.as_deref(), &values);
    tracing::info!(
        fields = values.len(),
        total = total.as_ref().map(tracing::field::display),
        "form submitted"
    );
    present_in(definition, &values, total.as_ref(), locale)
}

/// What is shown instead of the form when the configuration cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    /// Always [`ERROR_TITLE`].
    pub title: String,

    /// The error's display text.
    pub description: String,
}

impl ErrorView {
    /// Describe a load failure.
    pub fn new(err: &dyn std::error::Error) -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            description: err.to_string(),
        }
    }
}
