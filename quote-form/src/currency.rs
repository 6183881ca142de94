//! Locale-aware currency formatting for the total line.
//!
//! The locale is taken from the environment the way POSIX programs pick their
//! monetary conventions (`LC_ALL`, then `LC_MONETARY`, then `LANG`), falling
//! back to `en-US`. Only the conventions that matter for a single amount are
//! modelled: currency symbol, minor-unit digits, digit grouping, decimal
//! separator and symbol placement.

use std::fmt;

use quote_form_types::FormError;

/// Environment variables consulted for the locale, highest priority first.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MONETARY", "LANG"];

const NBSP: char = '\u{a0}';

/// A language with an optional region, e.g. `de-CH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    /// Parse a POSIX locale name (`de_DE.UTF-8@euro`) or a language tag (`de-DE`).
    ///
    /// Returns `None` for `C`, `POSIX` and anything that does not start with a
    /// language code.
    pub fn parse(tag: &str) -> Option<Self> {
        let base = tag.split(['.', '@']).next().unwrap_or_default();
        if base.eq_ignore_ascii_case("C") || base.eq_ignore_ascii_case("POSIX") {
            return None;
        }
        let mut parts = base.split(['_', '-']);
        let language = parts.next()?;
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return None;
        }
        let region = parts
            .next()
            .filter(|r| r.len() == 2 && r.chars().all(|c| c.is_ascii_alphabetic()))
            .map(str::to_ascii_uppercase);
        Some(Self {
            language: language.to_ascii_lowercase(),
            region,
        })
    }

    /// The locale of the current process.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Resolve the locale from variables provided by `lookup`.
    ///
    /// The first non-empty variable decides; if it names no usable locale
    /// (e.g. `C`), the default applies.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        LOCALE_VARS
            .iter()
            .find_map(|var| lookup(var).filter(|v| !v.is_empty()))
            .and_then(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    /// The language subtag, lowercase.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The region subtag, uppercase.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    fn conventions(&self) -> Conventions {
        if self.region() == Some("CH") {
            return Conventions {
                group: "\u{2019}",
                decimal: '.',
                symbol: SymbolPlacement::Before { space: true },
            };
        }
        match self.language() {
            "de" | "es" | "it" | "nl" | "pt" => Conventions {
                group: ".",
                decimal: ',',
                symbol: SymbolPlacement::After,
            },
            "fr" => Conventions {
                group: "\u{202f}",
                decimal: ',',
                symbol: SymbolPlacement::After,
            },
            _ => Conventions {
                group: ",",
                decimal: '.',
                symbol: SymbolPlacement::Before { space: false },
            },
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            region: Some("US".to_string()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{region}", self.language),
            None => write!(f, "{}", self.language),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPlacement {
    /// `$1.00`, or `CHF 1.00` with `space`.
    Before { space: bool },

    /// `1,00 €`
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conventions {
    group: &'static str,
    decimal: char,
    symbol: SymbolPlacement,
}

/// Formats amounts of one currency in one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormatter {
    code: String,
    symbol: String,
    digits: usize,
    conventions: Conventions,
}

impl CurrencyFormatter {
    /// Create a formatter for an ISO 4217 code (case-insensitive).
    ///
    /// # Errors
    /// `FormError::InvalidCurrency` unless the code is three ASCII letters.
    pub fn new(currency: &str, locale: &Locale) -> Result<Self, FormError> {
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(FormError::InvalidCurrency(currency.to_string()));
        }
        let code = currency.to_ascii_uppercase();
        Ok(Self {
            symbol: symbol(&code).unwrap_or(&code).to_string(),
            digits: minor_digits(&code),
            conventions: locale.conventions(),
            code,
        })
    }

    /// The normalized currency code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Format an amount, rounding half away from zero to the currency's
    /// minor unit.
    pub fn format(&self, amount: f64) -> String {
        let number = if amount.is_nan() {
            "NaN".to_string()
        } else if amount.is_infinite() {
            "∞".to_string()
        } else {
            self.format_digits(amount.abs())
        };
        let sign = if amount < 0.0 { "-" } else { "" };

        match self.conventions.symbol {
            SymbolPlacement::Before { space } => {
                let space = space || self.symbol.ends_with(|c: char| c.is_alphabetic());
                let sep = if space { NBSP.to_string() } else { String::new() };
                format!("{sign}{}{sep}{number}", self.symbol)
            }
            SymbolPlacement::After => format!("{sign}{number}{NBSP}{}", self.symbol),
        }
    }

    fn format_digits(&self, amount: f64) -> String {
        let (int_part, frac_part) = round_decimal(amount, self.digits);
        let grouped = group_thousands(&int_part, self.conventions.group);
        if frac_part.is_empty() {
            grouped
        } else {
            format!("{grouped}{}{frac_part}", self.conventions.decimal)
        }
    }
}

/// Format an amount as currency in a locale.
pub fn format_currency(amount: f64, currency: &str, locale: &Locale) -> Result<String, FormError> {
    Ok(CurrencyFormatter::new(currency, locale)?.format(amount))
}

/// Round a non-negative finite number to `digits` decimals, half away from
/// zero, working on its shortest decimal representation so that `1.005`
/// rounds to `1.01`.
fn round_decimal(amount: f64, digits: usize) -> (String, String) {
    let repr = format!("{amount}");
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((&repr, ""));

    let mut all: Vec<u8> = int_part.bytes().collect();
    let kept = frac_part.len().min(digits);
    all.extend_from_slice(&frac_part.as_bytes()[..kept]);
    all.resize(int_part.len() + digits, b'0');

    if frac_part.as_bytes().get(digits).is_some_and(|d| *d >= b'5') {
        let mut idx = all.len();
        loop {
            if idx == 0 {
                all.insert(0, b'1');
                break;
            }
            idx -= 1;
            if all[idx] == b'9' {
                all[idx] = b'0';
            } else {
                all[idx] += 1;
                break;
            }
        }
    }

    let split = all.len() - digits;
    let frac = all.split_off(split);
    (
        String::from_utf8_lossy(&all).into_owned(),
        String::from_utf8_lossy(&frac).into_owned(),
    )
}

fn group_thousands(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

fn symbol(code: &str) -> Option<&'static str> {
    Some(match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CNY" => "CN¥",
        "KRW" => "₩",
        "INR" => "₹",
        "ILS" => "₪",
        "VND" => "₫",
        "BRL" => "R$",
        "CAD" => "CA$",
        "AUD" => "A$",
        "NZD" => "NZ$",
        "MXN" => "MX$",
        "HKD" => "HK$",
        "TWD" => "NT$",
        "PHP" => "₱",
        _ => return None,
    })
}

fn minor_digits(code: &str) -> usize {
    match code {
        "JPY" | "KRW" | "VND" | "CLP" | "ISK" | "PYG" | "UGX" => 0,
        "BHD" | "KWD" | "JOD" | "OMR" | "TND" | "IQD" | "LYD" => 3,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    fn fmt(amount: f64, currency: &str, tag: &str) -> String {
        format_currency(amount, currency, &locale(tag)).unwrap()
    }

    #[test]
    fn parse_locale_names() {
        assert_eq!(locale("de_DE.UTF-8").to_string(), "de-DE");
        assert_eq!(locale("fr_CH.UTF-8@euro").to_string(), "fr-CH");
        assert_eq!(locale("en-us").to_string(), "en-US");
        assert_eq!(locale("ja").to_string(), "ja");
        assert_eq!(Locale::parse("C"), None);
        assert_eq!(Locale::parse("POSIX"), None);
        assert_eq!(Locale::parse("C.UTF-8"), None);
        assert_eq!(Locale::parse(""), None);
    }

    #[test]
    fn locale_from_vars_priority() {
        let vars = |pairs: &'static [(&'static str, &'static str)]| {
            move |name: &str| {
                pairs
                    .iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| v.to_string())
            }
        };

        assert_eq!(
            Locale::from_vars(vars(&[("LANG", "de_DE.UTF-8"), ("LC_MONETARY", "fr_FR")])),
            locale("fr-FR")
        );
        assert_eq!(
            Locale::from_vars(vars(&[("LC_ALL", ""), ("LANG", "it_IT")])),
            locale("it-IT")
        );
        assert_eq!(
            Locale::from_vars(vars(&[("LC_ALL", "C"), ("LANG", "de_DE")])),
            Locale::default()
        );
        assert_eq!(Locale::from_vars(vars(&[])), Locale::default());
    }

    #[test]
    fn english_conventions() {
        assert_eq!(fmt(1234.5, "USD", "en-US"), "$1,234.50");
        assert_eq!(fmt(10.0, "EUR", "en-US"), "€10.00");
        assert_eq!(fmt(0.0, "USD", "en-US"), "$0.00");
        assert_eq!(fmt(1_000_000.0, "GBP", "en-GB"), "£1,000,000.00");
        assert_eq!(fmt(-42.0, "USD", "en-US"), "-$42.00");
        assert_eq!(fmt(5.0, "CHF", "en-US"), "CHF\u{a0}5.00");
        assert_eq!(fmt(5.0, "xyz", "en-US"), "XYZ\u{a0}5.00");
    }

    #[test]
    fn continental_conventions() {
        assert_eq!(fmt(1234.5, "EUR", "de-DE"), "1.234,50\u{a0}€");
        assert_eq!(fmt(10.0, "EUR", "es-ES"), "10,00\u{a0}€");
        assert_eq!(fmt(-3.0, "USD", "pt-BR"), "-3,00\u{a0}$");
        assert_eq!(fmt(1234.5, "EUR", "fr-FR"), "1\u{202f}234,50\u{a0}€");
        assert_eq!(fmt(1234.5, "CHF", "de-CH"), "CHF\u{a0}1\u{2019}234.50");
    }

    #[test]
    fn minor_units() {
        assert_eq!(fmt(1234.5, "JPY", "ja-JP"), "¥1,235");
        assert_eq!(fmt(1234.4, "KRW", "en-US"), "₩1,234");
        assert_eq!(fmt(1.2345, "KWD", "en-US"), "KWD\u{a0}1.235");
    }

    #[test]
    fn rounds_half_away_from_zero_on_decimal_digits() {
        assert_eq!(fmt(1.005, "USD", "en-US"), "$1.01");
        assert_eq!(fmt(0.125, "USD", "en-US"), "$0.13");
        assert_eq!(fmt(999.995, "USD", "en-US"), "$1,000.00");
        assert_eq!(fmt(-0.005, "USD", "en-US"), "-$0.01");
        assert_eq!(fmt(0.1 + 0.2, "USD", "en-US"), "$0.30");
    }

    #[test]
    fn non_finite_amounts() {
        assert_eq!(fmt(f64::NAN, "USD", "en-US"), "$NaN");
        assert_eq!(fmt(f64::NAN, "EUR", "de-DE"), "NaN\u{a0}€");
        assert_eq!(fmt(f64::INFINITY, "USD", "en-US"), "$∞");
        assert_eq!(fmt(f64::NEG_INFINITY, "USD", "en-US"), "-$∞");
    }

    #[test]
    fn invalid_codes() {
        for code in ["", "US", "EURO", "U$D", "12€"] {
            assert!(
                matches!(
                    format_currency(1.0, code, &Locale::default()),
                    Err(FormError::InvalidCurrency(_))
                ),
                "{code:?} should be rejected"
            );
        }
    }
}
