//! # quote-form
//!
//! Render forms from a declarative JSON schema, collect the input and compute
//! a formatted total. Backend-agnostic.
//!
//! The pipeline is linear:
//!
//! 1. [`load_config`] retrieves the `FormConfig` (file or URL)
//! 2. [`Form::assemble`] normalizes it and creates the initial `FormState`
//! 3. a backend presents the controls and writes user changes into the state
//! 4. on submit, the values are collected, the formula is evaluated by the
//!    closed [`expr`] interpreter and the [`presenter`] formats the result
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quote_form::{ConfigSource, Form, TestBackend, load_config};
//!
//! let config = load_config(&ConfigSource::default())?;
//! let mut form = Form::assemble(&config);
//! form.run(&TestBackend::new().with_text("hours", "3"))?;
//! println!("{}", form.phase().presentation().unwrap().to_text());
//! ```
//!
//! ## Configuration
//!
//! ```json
//! {
//!   "title": "Repair quote",
//!   "fields": [
//!     { "name": "hours", "type": "number", "min": 1, "required": true },
//!     { "name": "rate", "type": "range", "min": 20, "max": 120, "step": 5 },
//!     { "name": "rush", "type": "checkbox", "label": "Rush job" }
//!   ],
//!   "totalExpression": "values.hours * values.rate + (values.rush ? 50 : 0)",
//!   "currency": "EUR"
//! }
//! ```
//!
//! ## Backends
//!
//! Backends are separate crates that implement `FormBackend`:
//! - `quote-form-html` - Static HTML host page
//! - `quote-form-ratatui` - Interactive terminal form

// Re-export all types from quote-form-types
pub use quote_form_types::*;

pub mod currency;
pub mod expr;
pub mod presenter;

mod form;
pub use form::{ERROR_TITLE, ErrorView, Form, submit_state};

mod loader;
pub use loader::{ConfigError, ConfigSource, DEFAULT_CONFIG_LOCATION, load_config};

// Test backend for running forms without user interaction
mod test_backend;
pub use test_backend::{TestBackend, TestBackendError};
