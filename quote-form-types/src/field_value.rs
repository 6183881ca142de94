use serde::{Serialize, Serializer};

/// A single coerced value collected from a form.
///
/// This is the value stored in `CollectedValues` for each rendered field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A numeric value (from number and range fields). May be NaN when the
    /// control held text that does not parse as a number.
    Number(f64),

    /// A boolean value (from checkbox fields).
    Bool(bool),

    /// A string value (from text, select and unrecognized fields).
    String(String),
}

impl FieldValue {
    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get this value as a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the type name of this value for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "Number",
            Self::Bool(_) => "Bool",
            Self::String(_) => "String",
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serialize_number(*n, serializer),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

/// Magnitude from which numbers print in exponent form.
const EXPONENT_THRESHOLD: f64 = 1e21;

/// Serialize a number the way a browser's `JSON.stringify` does: integral
/// values below 1e21 as plain digits, non-finite values as `null`.
pub fn serialize_number<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !n.is_finite() {
        return serializer.serialize_none();
    }
    if n.fract() == 0.0 && n.abs() < EXPONENT_THRESHOLD {
        // Shortest round-trip digits, zero padded.
        let digits = n.to_string();
        if let Ok(int) = digits.parse::<i64>() {
            return serializer.serialize_i64(int);
        }
        if let Ok(int) = digits.parse::<u64>() {
            return serializer.serialize_u64(int);
        }
    }
    serializer.serialize_f64(n)
}

/// Parse control text as a number.
///
/// Surrounding whitespace is ignored and empty text is `0`. Text that is not
/// a decimal number yields NaN rather than an error.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // `f64::from_str` also accepts spellings like "inf" and "nan".
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Render a number as display text: `5` rather than `5.0`, `Infinity`
/// rather than `inf`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= EXPONENT_THRESHOLD {
        exponent_form(n)
    } else {
        format!("{n}")
    }
}

/// `1e+21`, `-1.5e+22`.
fn exponent_form(n: f64) -> String {
    let text = format!("{n:e}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_rules() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("   "), 0.0);
        assert_eq!(parse_number(" 12 "), 12.0);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("-2.5"), -2.5);
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("nan").is_nan());
    }

    #[test]
    fn format_number_rules() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn large_numbers_switch_to_exponent_at_1e21() {
        assert_eq!(format_number(1e16), "10000000000000000");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e22), "-1.5e+22");
        assert_eq!(parse_number(&format_number(1e21)), 1e21);
    }

    #[test]
    fn numbers_serialize_like_json_stringify() {
        let json = serde_json::to_string(&FieldValue::Number(5.0)).unwrap();
        assert_eq!(json, "5");

        let json = serde_json::to_string(&FieldValue::Number(2.25)).unwrap();
        assert_eq!(json, "2.25");

        let json = serde_json::to_string(&FieldValue::Number(f64::NAN)).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn large_integers_serialize_without_exponent() {
        let json = serde_json::to_string(&FieldValue::Number(1e16)).unwrap();
        assert_eq!(json, "10000000000000000");

        let json = serde_json::to_string(&FieldValue::Number(-1e18)).unwrap();
        assert_eq!(json, "-1000000000000000000");

        let json = serde_json::to_string(&FieldValue::Number(1e19)).unwrap();
        assert_eq!(json, "10000000000000000000");

        let json = serde_json::to_string(&FieldValue::Number(-0.0)).unwrap();
        assert_eq!(json, "0");

        let value = serde_json::to_value(FieldValue::Number(1e16)).unwrap();
        assert_eq!(value.as_f64(), Some(1e16));
    }

    #[test]
    fn accessors() {
        assert_eq!(FieldValue::from("x").as_str(), Some("x"));
        assert_eq!(FieldValue::from(3).as_number(), Some(3.0));
        assert_eq!(FieldValue::from(true).as_bool(), Some(true));
        assert_eq!(FieldValue::from(true).as_str(), None);
        assert_eq!(FieldValue::from(1.5).type_name(), "Number");
    }
}
