//! Form descriptions shared by the tests and demos of the workspace.
//!
//! Each module holds the raw JSON of one form and a helper parsing it.

use quote_form_types::FormConfig;

fn parse(json: &str) -> FormConfig {
    FormConfig::from_json(json).expect("bundled form description is valid JSON")
}

/// Every field kind, a select default and a formula over all of them.
pub mod repair_quote {
    use super::*;

    pub const JSON: &str = include_str!("../forms/repair_quote.json");

    pub fn config() -> FormConfig {
        parse(JSON)
    }
}

/// Options given as a value-to-label map and as plain strings, string
/// bounds, a `formula` with a `return` body, and a non-USD currency.
pub mod catering {
    use super::*;

    pub const JSON: &str = include_str!("../forms/catering.json");

    pub fn config() -> FormConfig {
        parse(JSON)
    }
}

/// A formula that does not parse.
pub mod broken_formula {
    use super::*;

    pub const JSON: &str = include_str!("../forms/broken_formula.json");

    pub fn config() -> FormConfig {
        parse(JSON)
    }
}

/// No title, no formula, a duplicate name, a field with neither name nor id,
/// an unknown type and a type in upper case.
pub mod survey {
    use super::*;

    pub const JSON: &str = include_str!("../forms/survey.json");

    pub fn config() -> FormConfig {
        parse(JSON)
    }
}
