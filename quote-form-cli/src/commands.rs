use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use quote_form::currency::CurrencyFormatter;
use quote_form::expr::{Expression, Value};
use quote_form::presenter::present_in;
use quote_form::{
    ConfigError, ConfigSource, ERROR_TITLE, ErrorView, FieldValue, Form, load_config,
};
use quote_form_html::{HtmlOptions, render_error_page, render_page};
use quote_form_ratatui::{RatatuiFormBackend, RatatuiFormError};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::log_filter;

/// Install the stderr subscriber. `RUST_LOG` wins over the `-v` count.
pub fn init_logging(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load and assemble the form named on the command line.
pub fn load_form(config: &str) -> Result<Form, ConfigError> {
    let source = ConfigSource::from_arg(config);
    tracing::info!(%source, "loading form description");
    let config = load_config(&source)?;
    Ok(Form::assemble(&config))
}

fn report_load_error(err: &ConfigError) -> ExitCode {
    tracing::error!(error = %err, "cannot load form description");
    let view = ErrorView::new(err);
    eprintln!("{}: {}", view.title, view.description);
    ExitCode::FAILURE
}

fn apply_sets(form: &mut Form, sets: &[(String, String)]) -> anyhow::Result<()> {
    for (name, value) in sets {
        form.set_value(name, value)
            .with_context(|| format!("--set {name}"))?;
    }
    Ok(())
}

/// Options of the `html` subcommand.
#[derive(Debug, Clone, Default)]
pub struct HtmlRequest {
    pub sets: Vec<(String, String)>,
    pub submit: bool,
    pub fragment: bool,
    pub no_styles: bool,
}

/// Write the host page, or the error page when the description cannot be loaded.
pub fn cmd_html(
    config: &str,
    request: &HtmlRequest,
    out: &mut dyn Write,
) -> anyhow::Result<ExitCode> {
    let options = HtmlOptions::new()
        .with_styles(!request.no_styles)
        .full_document(!request.fragment);

    let mut form = match load_form(config) {
        Ok(form) => form,
        Err(err) => {
            let code = report_load_error(&err);
            out.write_all(render_error_page(&ErrorView::new(&err), &options).as_bytes())?;
            return Ok(code);
        }
    };

    apply_sets(&mut form, &request.sets)?;
    if request.submit {
        form.submit()?;
    }
    out.write_all(render_page(&form, &options).as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

/// Run the interactive terminal form and print the last result.
pub fn cmd_tui(config: &str, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let mut form = match load_form(config) {
        Ok(form) => form,
        Err(err) => return Ok(report_load_error(&err)),
    };

    if let Err(err) = form.run(&RatatuiFormBackend::new()) {
        if matches!(
            err.downcast_ref::<RatatuiFormError>(),
            Some(RatatuiFormError::Cancelled)
        ) {
            tracing::info!("form cancelled");
            return Ok(ExitCode::FAILURE);
        }
        return Err(err);
    }

    if let Some(presentation) = form.phase().presentation() {
        writeln!(out, "{}", presentation.to_text())?;
    }
    Ok(ExitCode::SUCCESS)
}

fn total_json(total: Option<&Value>) -> serde_json::Value {
    match total {
        Some(Value::Number(n)) if n.is_finite() => {
            serde_json::to_value(FieldValue::Number(*n)).unwrap_or_default()
        }
        Some(value) if !value.is_nullish() => serde_json::json!(value.to_string()),
        _ => serde_json::Value::Null,
    }
}

/// Submit once without interaction.
///
/// Refuses with a failure code when native constraints are violated, the
/// way a browser blocks the submit event.
pub fn cmd_submit(
    config: &str,
    sets: &[(String, String)],
    json: bool,
    out: &mut dyn Write,
) -> anyhow::Result<ExitCode> {
    let mut form = match load_form(config) {
        Ok(form) => form,
        Err(err) => return Ok(report_load_error(&err)),
    };
    apply_sets(&mut form, sets)?;

    let violations = form.violations();
    if !violations.is_empty() {
        for violation in &violations {
            tracing::error!(field = %violation.name, "{}", violation.message);
            eprintln!("{}: {}", violation.name, violation.message);
        }
        return Ok(ExitCode::FAILURE);
    }

    let values = form.collect();
    let total = form.total(&values);
    let presentation = present_in(form.definition(), &values, total.as_ref(), form.locale())?;

    if json {
        let report = serde_json::json!({
            "values": values,
            "total": total_json(total.as_ref()),
            "totalLine": presentation.total_line,
        });
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", presentation.to_text())?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Load the description, compile the formula, try it on the defaults and
/// validate the currency.
pub fn cmd_check(config: &str, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let form = match load_form(config) {
        Ok(form) => form,
        Err(err) => {
            writeln!(out, "{ERROR_TITLE}: {err}")?;
            return Ok(report_load_error(&err));
        }
    };
    let definition = form.definition();
    let mut ok = true;

    writeln!(out, "{}: {} field(s)", definition.title, definition.len())?;
    for field in definition.fields() {
        writeln!(out, "  {} ({})", field.name(), field.kind().type_name())?;
    }

    match definition.expression.as_deref() {
        None => writeln!(out, "total: none")?,
        Some(source) => match Expression::compile(source)
            .and_then(|expression| expression.evaluate(&form.collect()))
        {
            Ok(value) => writeln!(out, "total: {value} with defaults")?,
            Err(err) => {
                ok = false;
                writeln!(out, "total: {err}")?;
            }
        },
    }

    match CurrencyFormatter::new(&definition.currency, form.locale()) {
        Ok(formatter) => writeln!(out, "currency: {} ({})", formatter.code(), form.locale())?,
        Err(err) => {
            ok = false;
            writeln!(out, "currency: {err}")?;
        }
    }

    out.flush().context("cannot write report")?;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
