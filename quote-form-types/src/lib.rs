//! Core types for the quote-form crate.
//!
//! This crate provides the foundational types for declarative forms:
//! - `FormConfig` and `FieldSpec` - The form description as loaded from JSON
//! - `FormDefinition`, `Field` and `FieldKind` - The normalized, explicit schema
//! - `FormState` and `ControlState` - The authoritative current control values
//! - `CollectedValues` and `FieldValue` - The coerced snapshot taken at submit
//! - `Presentation` and `Phase` - What the result area shows
//! - `FormBackend` trait - For implementing presentation backends

mod field_name;
pub use field_name::FieldName;

pub mod field_value;
pub use field_value::FieldValue;

mod collected_values;
pub use collected_values::{CollectError, CollectedValues};

pub mod field;
pub use field::{
    CheckboxField, Field, FieldKind, InputField, RangeField, SelectField, SelectOption,
};

mod form_config;
pub use form_config::{
    DEFAULT_CURRENCY, DEFAULT_SUBMIT_LABEL, DEFAULT_TITLE, FieldSpec, FormConfig, FormDefinition,
};

mod form_state;
pub use form_state::{ConstraintViolation, ControlState, FormState};

mod presentation;
pub use presentation::{Phase, Presentation};

mod error;
pub use error::{FormError, SetValueError};

mod backend;
pub use backend::{FormBackend, SubmitHandler};
