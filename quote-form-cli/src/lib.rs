//! Command-line front end for quote-form.
//!
//! `cli` holds the argument definitions, `commands` the subcommand bodies.
//! Commands write to a caller-provided writer so they can be exercised
//! without a terminal.

pub mod cli;
pub mod commands;
