//! # quote-form-html
//!
//! Generate the HTML host page for a quote-form.
//!
//! The page contains a heading (`#title`), a description (`#desc`), the form
//! (`#form`) with one row per field and a submit button, and the result area
//! (`#result`). Controls are painted from the form's current state, so a form
//! that has been filled and submitted renders with its values and result.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quote_form::{Form, load_config, ConfigSource};
//! use quote_form_html::{HtmlOptions, render_page};
//!
//! let config = load_config(&ConfigSource::default())?;
//! let form = Form::assemble(&config);
//! std::fs::write("form.html", render_page(&form, &HtmlOptions::new()))?;
//! ```

mod generator;

pub use generator::{
    HtmlOptions, escape_html, render_error_page, render_field, render_page, render_result, to_html,
};
