//! HTML host page generator implementation.

use quote_form::field_value::format_number;
use quote_form::{ControlState, ErrorView, Field, FieldKind, Form, InputField, Phase, RangeField};

/// Options for HTML generation.
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    /// Whether to include default CSS styling.
    pub include_styles: bool,
    /// Whether to generate a complete HTML document (with html/head/body tags).
    pub full_document: bool,
}

impl HtmlOptions {
    /// Create new options with default values.
    pub fn new() -> Self {
        Self {
            include_styles: true,
            full_document: true,
        }
    }

    /// Enable or disable default CSS styling.
    pub fn with_styles(mut self, include: bool) -> Self {
        self.include_styles = include;
        self
    }

    /// Generate a complete HTML document or just the page body.
    pub fn full_document(mut self, full: bool) -> Self {
        self.full_document = full;
        self
    }
}

/// Render the host page for a form with default options.
pub fn to_html(form: &Form) -> String {
    render_page(form, &HtmlOptions::new())
}

/// Render the host page for a form.
///
/// The page carries the elements `#title`, `#desc`, `#form` and `#result`.
/// Controls are painted from the form's current state; the result area is
/// hidden until the form has been submitted.
pub fn render_page(form: &Form, options: &HtmlOptions) -> String {
    let definition = form.definition();

    let mut body = String::new();
    body.push_str(&format!(
        "  <h1 id=\"title\">{}</h1>\n",
        escape_html(&definition.title)
    ));
    body.push_str(&format!(
        "  <p id=\"desc\">{}</p>\n",
        escape_html(&definition.description)
    ));

    body.push_str("  <form id=\"form\" onsubmit=\"event.preventDefault()\">\n");
    for field in definition.fields() {
        let Some(control) = form.state().get(field.name().as_str()) else {
            continue;
        };
        body.push_str(&indent(&render_field(field, control), 2));
    }
    body.push_str(&format!(
        "    <button type=\"submit\">{}</button>\n",
        escape_html(&definition.submit_label)
    ));
    body.push_str("  </form>\n");

    body.push_str(&indent(&render_result(form.phase()), 1));

    wrap_document(&definition.title, &body, options)
}

/// Render the page shown when the configuration could not be loaded: the
/// error in place of title and description, no form.
pub fn render_error_page(error: &ErrorView, options: &HtmlOptions) -> String {
    let body = format!(
        "  <h1 id=\"title\">{}</h1>\n  <p id=\"desc\">{}</p>\n  <form id=\"form\" hidden></form>\n  <div id=\"result\" hidden></div>\n",
        escape_html(&error.title),
        escape_html(&error.description)
    );
    wrap_document(&error.title, &body, options)
}

/// Render the result area for a phase.
pub fn render_result(phase: &Phase) -> String {
    let Some(presentation) = phase.presentation() else {
        return "<div id=\"result\" hidden></div>\n".to_string();
    };

    let mut html = String::from("<div id=\"result\">\n");
    if let Some(total) = &presentation.total_line {
        html.push_str(&format!(
            "  <div class=\"total\">{}</div>\n",
            escape_html(total)
        ));
    }
    html.push_str(&format!(
        "  <pre>{}</pre>\n",
        escape_html(&presentation.values_dump)
    ));
    html.push_str("</div>\n");
    html
}

/// Render one field as a self-contained row.
///
/// Range sliders and checkboxes get a composite inline row; every other kind
/// is a generic row of label, control and hint.
pub fn render_field(field: &Field, control: &ControlState) -> String {
    let id = escape_html(field.name().as_str());
    let label = format!(
        "<label for=\"{id}\">{}</label>",
        escape_html(field.label())
    );
    let hint = field
        .hint()
        .map(|h| format!("<div class=\"hint\">{}</div>", escape_html(h)))
        .unwrap_or_default();

    match field.kind() {
        FieldKind::Range(range) => {
            let value = match control {
                ControlState::Range(v) => *v,
                _ => range.initial_value(),
            };
            let readout = escape_html(&field.name().readout_id());
            format!(
                "<div class=\"row inline\">\n  <div>{label}{hint}</div>\n  <div>{} <span id=\"{readout}\">{}</span></div>\n</div>\n",
                range_input(&id, range, value),
                format_number(value)
            )
        }
        FieldKind::Checkbox(_) => {
            let checked = if matches!(control, ControlState::Checkbox(true)) {
                " checked"
            } else {
                ""
            };
            format!(
                "<div class=\"row inline\">\n  <div>{label}{hint}</div>\n  <input id=\"{id}\" name=\"{id}\" type=\"checkbox\"{checked}>\n</div>\n"
            )
        }
        FieldKind::Select(select) => {
            let selected = match control {
                ControlState::Select(idx) => *idx,
                _ => select.initial_index(),
            };
            let required = if field.required() { " required" } else { "" };
            let mut html = format!(
                "<div class=\"row\">\n  {label}\n  <select id=\"{id}\" name=\"{id}\"{required}>\n"
            );
            if selected.is_none() && !select.options.is_empty() {
                // Without this a browser would fall back to the first option.
                html.push_str("    <option value=\"\" selected hidden></option>\n");
            }
            for (idx, option) in select.options.iter().enumerate() {
                let mark = if selected == Some(idx) { " selected" } else { "" };
                html.push_str(&format!(
                    "    <option value=\"{}\"{mark}>{}</option>\n",
                    escape_html(&option.value),
                    escape_html(&option.label)
                ));
            }
            html.push_str("  </select>\n");
            push_hint(&mut html, &hint);
            html.push_str("</div>\n");
            html
        }
        FieldKind::Text(input) | FieldKind::Number(input) => {
            let value = control.text(field);
            let mut html = format!(
                "<div class=\"row\">\n  {label}\n  {}\n",
                text_input(&id, field.kind().type_name(), field.required(), input, &value)
            );
            push_hint(&mut html, &hint);
            html.push_str("</div>\n");
            html
        }
    }
}

fn push_hint(html: &mut String, hint: &str) {
    if !hint.is_empty() {
        html.push_str(&format!("  {hint}\n"));
    }
}

fn text_input(id: &str, kind: &str, required: bool, input: &InputField, value: &str) -> String {
    let mut attrs = format!("id=\"{id}\" name=\"{id}\" type=\"{kind}\"");
    if required {
        attrs.push_str(" required");
    }
    if let Some(min) = input.min {
        attrs.push_str(&format!(" min=\"{}\"", format_number(min)));
    }
    if let Some(max) = input.max {
        attrs.push_str(&format!(" max=\"{}\"", format_number(max)));
    }
    if let Some(step) = input.step {
        attrs.push_str(&format!(" step=\"{}\"", format_number(step)));
    }
    if let Some(placeholder) = &input.placeholder {
        attrs.push_str(&format!(" placeholder=\"{}\"", escape_html(placeholder)));
    }
    if !value.is_empty() {
        attrs.push_str(&format!(" value=\"{}\"", escape_html(value)));
    }
    format!("<input {attrs}>")
}

fn range_input(id: &str, range: &RangeField, value: f64) -> String {
    format!(
        "<input id=\"{id}\" name=\"{id}\" type=\"range\" min=\"{}\" max=\"{}\" step=\"{}\" value=\"{}\" oninput=\"this.nextElementSibling.textContent = this.value\">",
        format_number(range.min),
        format_number(range.max),
        format_number(range.step),
        format_number(value)
    )
}

fn indent(html: &str, level: usize) -> String {
    let pad = "  ".repeat(level);
    html.lines().map(|line| format!("{pad}{line}\n")).collect()
}

fn wrap_document(title: &str, body: &str, options: &HtmlOptions) -> String {
    if !options.full_document {
        return body.to_string();
    }

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("  <title>{}</title>\n", escape_html(title)));
    if options.include_styles {
        html.push_str(STYLES);
    }
    html.push_str("</head>\n<body>\n<main>\n");
    html.push_str(body);
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLES: &str = r#"  <style>
    main {
      max-width: 640px;
      margin: 2rem auto;
      padding: 1rem;
      font-family: system-ui, sans-serif;
    }
    #desc {
      color: #555;
    }
    .row {
      display: grid;
      gap: 0.25rem;
      margin: 0.75rem 0;
    }
    .row.inline {
      grid-template-columns: 1fr auto;
      align-items: center;
    }
    .row input[type="text"], .row input[type="number"], .row select {
      padding: 0.5rem;
      box-sizing: border-box;
    }
    .hint {
      font-size: 0.85rem;
      color: #777;
    }
    button[type="submit"] {
      margin-top: 1rem;
      padding: 0.5rem 1rem;
    }
    #result {
      margin-top: 1.5rem;
      padding: 1rem;
      background: #f5f5f5;
    }
    .total {
      font-size: 1.25rem;
      font-weight: bold;
      margin-bottom: 0.5rem;
    }
  </style>
"#;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quote_form::{CheckboxField, SelectField, SelectOption};

    use super::*;

    fn field(name: &str, kind: FieldKind) -> Field {
        Field::new(name, kind)
    }

    fn render(field: &Field) -> String {
        render_field(field, &ControlState::initial(field))
    }

    #[test]
    fn html_options_chaining() {
        let options = HtmlOptions::new().with_styles(false).full_document(false);
        assert!(!options.include_styles);
        assert!(!options.full_document);
        assert!(HtmlOptions::new().include_styles);
    }

    #[test]
    fn text_input_attributes_only_when_present() {
        let html = render(&field("who", FieldKind::Text(InputField::new())));
        assert_eq!(
            html,
            "<div class=\"row\">\n  <label for=\"who\">who</label>\n  <input id=\"who\" name=\"who\" type=\"text\">\n</div>\n"
        );
    }

    #[test]
    fn number_input_with_constraints_and_hint() {
        let input = InputField {
            min: Some(0.0),
            max: Some(40.0),
            step: Some(0.5),
            placeholder: Some("hours".to_string()),
            default: Some("2".to_string()),
        };
        let html = render(
            &field("hours", FieldKind::Number(input))
                .with_label("Labour")
                .with_hint("Half hours")
                .with_required(true),
        );
        assert!(html.contains(
            "<input id=\"hours\" name=\"hours\" type=\"number\" required min=\"0\" max=\"40\" step=\"0.5\" placeholder=\"hours\" value=\"2\">"
        ));
        assert!(html.ends_with("  <div class=\"hint\">Half hours</div>\n</div>\n"));
    }

    #[test]
    fn range_row_with_readout() {
        let html = render(&field(
            "rate",
            FieldKind::Range(RangeField::new(20.0, 120.0).with_step(5.0).with_default(62.0)),
        ));
        assert!(html.starts_with("<div class=\"row inline\">"));
        assert!(html.contains("value=\"60\""));
        assert!(html.contains("<span id=\"rate_out\">60</span>"));
        assert!(html.contains("oninput="));
    }

    #[test]
    fn checkbox_row() {
        let checked = render(&field(
            "rush",
            FieldKind::Checkbox(CheckboxField::with_default(true)),
        ));
        assert!(checked.starts_with("<div class=\"row inline\">"));
        assert!(checked.contains("type=\"checkbox\" checked>"));

        let unchecked = render(&field("rush", FieldKind::Checkbox(CheckboxField::new())));
        assert!(unchecked.contains("type=\"checkbox\">"));
    }

    #[test]
    fn select_marks_the_selected_option() {
        let options = vec![SelectOption::new("a", "A"), SelectOption::new("b", "B")];
        let html = render(&field(
            "plan",
            FieldKind::Select(SelectField::with_default(options.clone(), "b")),
        ));
        assert!(html.contains("<option value=\"a\">A</option>"));
        assert!(html.contains("<option value=\"b\" selected>B</option>"));

        let none = render(&field(
            "plan",
            FieldKind::Select(SelectField::with_default(options, "zzz")),
        ));
        assert!(none.contains("<option value=\"\" selected hidden></option>"));
    }

    #[test]
    fn escapes_text_and_attributes() {
        let html = render(
            &field(
                "x\"y",
                FieldKind::Text(InputField::with_default("<b>'&'</b>")),
            )
            .with_label("<script>"),
        );
        assert!(html.contains("<label for=\"x&quot;y\">&lt;script&gt;</label>"));
        assert!(html.contains("value=\"&lt;b&gt;&#39;&amp;&#39;&lt;/b&gt;\""));
    }

    #[test]
    fn result_hidden_until_submitted() {
        assert_eq!(
            render_result(&Phase::Unsubmitted),
            "<div id=\"result\" hidden></div>\n"
        );
    }
}
