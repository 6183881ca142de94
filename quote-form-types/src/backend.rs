use crate::{FormDefinition, FormError, FormState, Presentation};

/// The submit handler a backend calls each time the user submits.
///
/// It receives the current form state and returns what the result area
/// should show. Backends call it once per submit interaction, never
/// concurrently.
pub type SubmitHandler<'a> = dyn FnMut(&FormState) -> Result<Presentation, FormError> + 'a;

/// Trait for backend implementations that present a form and collect input.
///
/// Backends receive a `FormDefinition` and the initial `FormState`. They
/// paint their controls from the state, write user changes back into it, and
/// call the submit handler when the user submits. They decide how to present
/// the form (terminal form, scripted input, etc.).
pub trait FormBackend {
    /// The error type for this backend.
    type Error: Into<anyhow::Error>;

    /// Run the form until the user is done.
    ///
    /// # Returns
    /// * `Ok(state)` with the final form state once the user leaves the form
    /// * `Err` on backend failure (cancellation is reported by backends that
    ///   require a submit to finish)
    fn run(
        &self,
        definition: &FormDefinition,
        state: FormState,
        submit: &mut SubmitHandler<'_>,
    ) -> Result<FormState, Self::Error>;
}
