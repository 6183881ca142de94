//! A closed interpreter for total expressions.
//!
//! Expressions are arithmetic over the collected values, written in a small
//! JavaScript-like language:
//!
//! ```text
//! values.hours * values.rate + (values.rush ? 50 : 0)
//! return Math.max(values.qty, 1) * 9.5;
//! ```
//!
//! Only `values` (the collected snapshot) and `Math` are in scope. There is
//! no assignment, no statements besides one optional `return`, and no way to
//! reach anything outside the snapshot.

mod eval;
mod lexer;
mod parser;

use std::fmt;

use quote_form_types::CollectedValues;
use quote_form_types::field_value::{format_number, parse_number};

use self::lexer::{is_ident_continue, tokenize};
use self::parser::{Expr, parse};

/// Error raised while compiling or evaluating an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    /// The source is not a valid expression.
    #[error("SyntaxError at {position}: {message}")]
    Syntax { position: usize, message: String },

    /// An identifier other than `values` and `Math` was used.
    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    /// An operation was applied to a value that does not support it.
    #[error("TypeError: {0}")]
    Type(String),
}

impl ExprError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    fn shifted(self, offset: usize) -> Self {
        match self {
            Self::Syntax { position, message } => Self::Syntax {
                position: position + offset,
                message,
            },
            other => other,
        }
    }
}

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),

    /// A non-primitive (`values`, `Math` or one of its functions).
    Object,
}

impl Value {
    /// Numeric conversion with JavaScript semantics.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Undefined | Self::Object => f64::NAN,
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => parse_number(s),
        }
    }

    /// Truthiness with JavaScript semantics.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Object => true,
        }
    }

    /// Whether this is `null` or `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::String(s) => write!(f, "{s}"),
            Self::Object => write!(f, "[object Object]"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// A compiled expression, ready to be evaluated against collected values.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    body: Option<Expr>,
}

impl Expression {
    /// Compile expression source.
    ///
    /// Source starting with the keyword `return` is a function body holding
    /// a single return statement; anything else is a bare expression. A
    /// trailing `;` is accepted either way.
    pub fn compile(source: &str) -> Result<Self, ExprError> {
        let offset = return_keyword_len(source);
        let body_src = &source[offset..];
        let tokens = tokenize(body_src).map_err(|err| err.shifted(offset))?;
        let body = parse(&tokens, body_src.len()).map_err(|err| err.shifted(offset))?;
        if offset == 0 && body.is_none() {
            return Err(ExprError::syntax(0, "expected an expression"));
        }
        Ok(Self { body })
    }

    /// Evaluate against a snapshot of collected values.
    pub fn evaluate(&self, values: &CollectedValues) -> Result<Value, ExprError> {
        match &self.body {
            Some(expr) => eval::evaluate(expr, values),
            None => Ok(Value::Undefined),
        }
    }
}

fn return_keyword_len(source: &str) -> usize {
    const KEYWORD: &str = "return";
    match source.strip_prefix(KEYWORD) {
        Some(rest) if !rest.starts_with(is_ident_continue) => KEYWORD.len(),
        _ => 0,
    }
}

/// Compute the total for a submit.
///
/// No expression means no total. Compile and evaluation errors are logged and
/// also mean no total: a broken formula never blocks showing the values.
pub fn compute_total(expression: Option<&str>, values: &CollectedValues) -> Option<Value> {
    let source = expression?;
    let result = Expression::compile(source).and_then(|expr| expr.evaluate(values));
    match result {
        Ok(Value::Number(n)) if n.is_finite() => Some(Value::Number(n + 0.0)),
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(%err, expression = source, "total calculation failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn values() -> CollectedValues {
        let mut values = CollectedValues::new();
        values.insert("a", 2.0);
        values.insert("b", 3.0);
        values.insert("name", "Ann");
        values.insert("rush", true);
        values
    }

    fn eval(src: &str) -> Result<Value, ExprError> {
        Expression::compile(src)?.evaluate(&values())
    }

    #[test]
    fn sums_values() {
        assert_eq!(eval("values.a + values.b").unwrap(), Value::Number(5.0));
    }

    #[test]
    fn return_prefix_and_semicolon() {
        assert_eq!(eval("return values.a * values.b;").unwrap(), Value::Number(6.0));
        assert_eq!(eval("return(values.a)").unwrap(), Value::Number(2.0));
        assert_eq!(eval("values.a;").unwrap(), Value::Number(2.0));
        assert_eq!(eval("return;").unwrap(), Value::Undefined);
        assert_eq!(eval("return").unwrap(), Value::Undefined);
    }

    #[test]
    fn return_must_be_a_whole_word() {
        assert_eq!(
            eval("returned").unwrap_err(),
            ExprError::Reference("returned".to_string())
        );
    }

    #[test]
    fn empty_source_is_a_syntax_error() {
        assert!(matches!(eval("   ").unwrap_err(), ExprError::Syntax { .. }));
    }

    #[test]
    fn syntax_error_positions_include_the_keyword() {
        let err = eval("return values.a +").unwrap_err();
        assert!(matches!(err, ExprError::Syntax { position: 17, .. }));
    }

    #[test]
    fn compute_total_without_expression() {
        assert_eq!(compute_total(None, &values()), None);
    }

    #[test]
    fn compute_total_swallows_errors() {
        assert_eq!(compute_total(Some("values.a +"), &values()), None);
        assert_eq!(compute_total(Some("window.alert(1)"), &values()), None);
        assert_eq!(compute_total(Some("values.missing.deep"), &values()), None);
    }

    #[test]
    fn compute_total_rejects_deep_nesting() {
        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(compute_total(Some(&deep), &values()), None);
        let negations = format!("{}1", "-".repeat(50_000));
        assert_eq!(compute_total(Some(&negations), &values()), None);
        let shallow = format!("{}values.a{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(compute_total(Some(&shallow), &values()), Some(Value::Number(2.0)));
    }

    #[test]
    fn compute_total_passes_non_numbers_through() {
        assert_eq!(
            compute_total(Some("values.name"), &values()),
            Some(Value::String("Ann".to_string()))
        );
        assert_eq!(
            compute_total(Some("values.missing"), &values()),
            Some(Value::Undefined)
        );
        let nan = compute_total(Some("values.name * 2"), &values()).unwrap();
        assert!(nan.to_number().is_nan());
    }

    #[test]
    fn negative_zero_normalizes() {
        let total = compute_total(Some("-0"), &values()).unwrap();
        let Value::Number(n) = total else {
            panic!("Expected number");
        };
        assert!(n.is_sign_positive());
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::from(" 12 ").to_number(), 12.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert!(Value::Undefined.to_number().is_nan());
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert!(!Value::Number(f64::NAN).truthy());
        assert!(Value::from("0").truthy());
    }
}
