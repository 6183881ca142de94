//! # quote-form-ratatui
//!
//! Terminal backend for quote-form.
//!
//! All controls are shown at once in a scrollable form. The user moves
//! between them with Tab/Shift+Tab or the arrow keys, adjusts ranges and
//! selects with Left/Right and submits as often as they like. Every submit
//! refreshes the result panel below the form.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quote_form::{ConfigSource, Form, load_config};
//! use quote_form_ratatui::RatatuiFormBackend;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = load_config(&ConfigSource::default())?;
//!     let mut form = Form::assemble(&config);
//!     form.run(&RatatuiFormBackend::new())?;
//!     if let Some(presentation) = form.phase().presentation() {
//!         println!("{}", presentation.to_text());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Tab, Down / Shift+Tab, Up | next / previous control |
//! | Left, Right | move a slider, cycle a select, move the text cursor |
//! | Space | tick a checkbox, cycle a select |
//! | Enter | submit (on the button), otherwise next control |
//! | F10, Ctrl+Enter | submit from anywhere |
//! | Esc | leave the form (cancels when nothing was submitted yet) |
//! | Ctrl+C | cancel |

mod backend;

pub use backend::{RatatuiFormBackend, RatatuiFormError, Theme};
