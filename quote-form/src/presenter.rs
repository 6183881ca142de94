//! Turning a submit's outcome into what the result area shows.

use quote_form_types::{CollectedValues, FormDefinition, FormError, Presentation};

use crate::currency::{CurrencyFormatter, Locale};
use crate::expr::Value;

/// Build the presentation in the process locale.
///
/// See [`present_in`].
pub fn present(
    definition: &FormDefinition,
    values: &CollectedValues,
    total: Option<&Value>,
) -> Result<Presentation, FormError> {
    present_in(definition, values, total, &Locale::from_env())
}

/// Build the presentation for a submit.
///
/// A total that is present and neither `null` nor `undefined` becomes a
/// `Total: <amount>` line, formatted in the form's currency. The values dump
/// is always produced.
///
/// # Errors
/// `FormError::InvalidCurrency` if a total has to be formatted and the form's
/// currency code is unusable.
pub fn present_in(
    definition: &FormDefinition,
    values: &CollectedValues,
    total: Option<&Value>,
    locale: &Locale,
) -> Result<Presentation, FormError> {
    let total_line = match total {
        Some(total) if !total.is_nullish() => {
            let formatter = CurrencyFormatter::new(&definition.currency, locale)?;
            Some(format!("Total: {}", formatter.format(total.to_number())))
        }
        _ => None,
    };

    Ok(Presentation {
        total_line,
        values_dump: values.to_pretty_json(),
    })
}
