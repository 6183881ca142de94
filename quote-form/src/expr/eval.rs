use std::cmp::Ordering;

use quote_form_types::{CollectedValues, FieldValue};

use super::parser::{BinaryOp, Expr, UnaryOp};
use super::{ExprError, Value};

/// Functions reachable through `Math`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MathFn {
    Min,
    Max,
    Round,
    Floor,
    Ceil,
    Trunc,
    Abs,
    Pow,
    Sqrt,
}

impl MathFn {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "min" => Self::Min,
            "max" => Self::Max,
            "round" => Self::Round,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "trunc" => Self::Trunc,
            "abs" => Self::Abs,
            "pow" => Self::Pow,
            "sqrt" => Self::Sqrt,
            _ => return None,
        })
    }

    fn call(self, args: &[f64]) -> f64 {
        let arg = |i: usize| args.get(i).copied().unwrap_or(f64::NAN);
        match self {
            Self::Min => args.iter().copied().fold(f64::INFINITY, |acc, n| {
                if acc.is_nan() || n.is_nan() { f64::NAN } else { acc.min(n) }
            }),
            Self::Max => args.iter().copied().fold(f64::NEG_INFINITY, |acc, n| {
                if acc.is_nan() || n.is_nan() { f64::NAN } else { acc.max(n) }
            }),
            Self::Round => round_half_up(arg(0)),
            Self::Floor => arg(0).floor(),
            Self::Ceil => arg(0).ceil(),
            Self::Trunc => arg(0).trunc(),
            Self::Abs => arg(0).abs(),
            Self::Pow => power(arg(0), arg(1)),
            Self::Sqrt => arg(0).sqrt(),
        }
    }
}

/// An intermediate value, which unlike [`Value`] can refer to the objects in
/// scope.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Value(Value),
    Values,
    Math,
    Function(MathFn),
}

impl Operand {
    fn into_value(self) -> Value {
        match self {
            Self::Value(v) => v,
            Self::Values | Self::Math | Self::Function(_) => Value::Object,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Value(Value::String(s)) => format!("\"{s}\""),
            Self::Value(v) => v.to_string(),
            Self::Values => "values".to_string(),
            Self::Math => "Math".to_string(),
            Self::Function(f) => format!("Math.{}", format!("{f:?}").to_lowercase()),
        }
    }
}

impl From<&FieldValue> for Value {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Number(n) => Self::Number(*n),
            FieldValue::Bool(b) => Self::Bool(*b),
            FieldValue::String(s) => Self::String(s.clone()),
        }
    }
}

pub(super) fn evaluate(expr: &Expr, values: &CollectedValues) -> Result<Value, ExprError> {
    Ok(Evaluator { values }.eval(expr)?.into_value())
}

struct Evaluator<'a> {
    values: &'a CollectedValues,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> Result<Operand, ExprError> {
        Ok(match expr {
            Expr::Number(n) => Operand::Value(Value::Number(*n)),
            Expr::Str(s) => Operand::Value(Value::String(s.clone())),
            Expr::Ident { name, .. } => resolve(name)?,
            Expr::Unary(op, operand) => {
                let v = self.value(operand)?;
                Operand::Value(match op {
                    UnaryOp::Neg => Value::Number(-v.to_number()),
                    UnaryOp::Plus => Value::Number(v.to_number()),
                    UnaryOp::Not => Value::Bool(!v.truthy()),
                })
            }
            Expr::Binary(op, left, right) => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                Operand::Value(binary(*op, l, r))
            }
            Expr::And(left, right) => {
                let l = self.eval(left)?;
                if truthy(&l) { self.eval(right)? } else { l }
            }
            Expr::Or(left, right) => {
                let l = self.eval(left)?;
                if truthy(&l) { l } else { self.eval(right)? }
            }
            Expr::Conditional(test, consequent, alternate) => {
                if truthy(&self.eval(test)?) {
                    self.eval(consequent)?
                } else {
                    self.eval(alternate)?
                }
            }
            Expr::Member { object, property } => {
                let object = self.eval(object)?;
                let key = self.value(property)?.to_string();
                self.member(object, &key)?
            }
            Expr::Call { callee, args } => {
                let callee = self.eval(callee)?;
                let Operand::Function(f) = callee else {
                    return Err(ExprError::Type(format!(
                        "{} is not a function",
                        callee.describe()
                    )));
                };
                let args = args
                    .iter()
                    .map(|arg| Ok(self.value(arg)?.to_number()))
                    .collect::<Result<Vec<_>, ExprError>>()?;
                Operand::Value(Value::Number(f.call(&args)))
            }
        })
    }

    fn value(&self, expr: &Expr) -> Result<Value, ExprError> {
        Ok(self.eval(expr)?.into_value())
    }

    fn member(&self, object: Operand, key: &str) -> Result<Operand, ExprError> {
        Ok(match object {
            Operand::Values => Operand::Value(
                self.values
                    .get(key)
                    .map(Value::from)
                    .unwrap_or(Value::Undefined),
            ),
            Operand::Math => match key {
                "PI" => Operand::Value(Value::Number(std::f64::consts::PI)),
                "E" => Operand::Value(Value::Number(std::f64::consts::E)),
                _ => MathFn::lookup(key)
                    .map(Operand::Function)
                    .unwrap_or(Operand::Value(Value::Undefined)),
            },
            Operand::Value(ref v) if v.is_nullish() => {
                return Err(ExprError::Type(format!(
                    "Cannot read properties of {v} (reading '{key}')"
                )));
            }
            Operand::Value(Value::String(s)) => Operand::Value(string_member(&s, key)),
            Operand::Value(_) | Operand::Function(_) => Operand::Value(Value::Undefined),
        })
    }
}

fn resolve(name: &str) -> Result<Operand, ExprError> {
    Ok(match name {
        "values" => Operand::Values,
        "Math" => Operand::Math,
        "true" => Operand::Value(Value::Bool(true)),
        "false" => Operand::Value(Value::Bool(false)),
        "null" => Operand::Value(Value::Null),
        "undefined" => Operand::Value(Value::Undefined),
        "NaN" => Operand::Value(Value::Number(f64::NAN)),
        "Infinity" => Operand::Value(Value::Number(f64::INFINITY)),
        _ => return Err(ExprError::Reference(name.to_string())),
    })
}

fn truthy(operand: &Operand) -> bool {
    match operand {
        Operand::Value(v) => v.truthy(),
        _ => true,
    }
}

fn string_member(s: &str, key: &str) -> Value {
    if key == "length" {
        return Value::Number(s.encode_utf16().count() as f64);
    }
    key.parse::<usize>()
        .ok()
        .and_then(|idx| s.chars().nth(idx))
        .map(|c| Value::String(c.to_string()))
        .unwrap_or(Value::Undefined)
}

fn binary(op: BinaryOp, left: Operand, right: Operand) -> Value {
    match op {
        BinaryOp::LooseEq => return Value::Bool(loose_eq(&left, &right)),
        BinaryOp::LooseNe => return Value::Bool(!loose_eq(&left, &right)),
        BinaryOp::StrictEq => return Value::Bool(strict_eq(&left, &right)),
        BinaryOp::StrictNe => return Value::Bool(!strict_eq(&left, &right)),
        _ => {}
    }

    let l = left.into_value();
    let r = right.into_value();
    match op {
        BinaryOp::Add => match (&l, &r) {
            (Value::String(_) | Value::Object, _) | (_, Value::String(_) | Value::Object) => {
                Value::String(format!("{l}{r}"))
            }
            _ => Value::Number(l.to_number() + r.to_number()),
        },
        BinaryOp::Sub => Value::Number(l.to_number() - r.to_number()),
        BinaryOp::Mul => Value::Number(l.to_number() * r.to_number()),
        BinaryOp::Div => Value::Number(l.to_number() / r.to_number()),
        BinaryOp::Rem => Value::Number(l.to_number() % r.to_number()),
        BinaryOp::Pow => Value::Number(power(l.to_number(), r.to_number())),
        BinaryOp::Lt => Value::Bool(compare(&l, &r) == Some(Ordering::Less)),
        BinaryOp::Gt => Value::Bool(compare(&l, &r) == Some(Ordering::Greater)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(&l, &r),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(&l, &r),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::LooseEq | BinaryOp::LooseNe | BinaryOp::StrictEq | BinaryOp::StrictNe => {
            unreachable!("equality handled above")
        }
    }
}

/// Relational comparison: two strings compare by code point, anything else
/// numerically. `None` when either side is NaN.
fn compare(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => l.to_number().partial_cmp(&r.to_number()),
    }
}

fn strict_eq(l: &Operand, r: &Operand) -> bool {
    match (l, r) {
        (Operand::Value(a), Operand::Value(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::Object, _) | (_, Value::Object) => false,
            _ => a == b,
        },
        _ => l == r,
    }
}

fn loose_eq(l: &Operand, r: &Operand) -> bool {
    let (Operand::Value(a), Operand::Value(b)) = (l, r) else {
        return match (l, r) {
            (Operand::Value(v), _) | (_, Operand::Value(v)) => {
                !v.is_nullish() && loose_eq_primitive(v, &Value::String("[object Object]".into()))
            }
            _ => l == r,
        };
    };
    loose_eq_primitive(a, b)
}

fn loose_eq_primitive(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        _ => a.to_number() == b.to_number(),
    }
}

/// `Math.round`: halves round towards positive infinity.
fn round_half_up(n: f64) -> f64 {
    let floor = n.floor();
    if n - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Exponentiation where `(±1) ** ±Infinity` and `x ** NaN` are NaN.
fn power(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        f64::NAN
    } else {
        base.powf(exponent)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::expr::{ExprError, Expression, Value};
    use quote_form_types::CollectedValues;

    fn values() -> CollectedValues {
        let mut values = CollectedValues::new();
        values.insert("hours", 3.0);
        values.insert("rate", 40.0);
        values.insert("plan", "pro");
        values.insert("qty", "4");
        values.insert("rush", true);
        values.insert("notes", "");
        values
    }

    fn eval(src: &str) -> Value {
        Expression::compile(src)
            .and_then(|e| e.evaluate(&values()))
            .unwrap_or_else(|err| panic!("{src}: {err}"))
    }

    fn eval_err(src: &str) -> ExprError {
        Expression::compile(src)
            .and_then(|e| e.evaluate(&values()))
            .unwrap_err()
    }

    fn num(src: &str) -> f64 {
        match eval(src) {
            Value::Number(n) => n,
            other => panic!("{src}: expected number, got {other:?}"),
        }
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(num("values.hours * values.rate + 10"), 130.0);
        assert_eq!(num("2 + 3 * 4 - 1"), 13.0);
        assert_eq!(num("(2 + 3) * 4"), 20.0);
        assert_eq!(num("7 % 4"), 3.0);
        assert_eq!(num("-7 % 4"), -3.0);
        assert_eq!(num("2 ** 3 ** 2"), 512.0);
        assert_eq!(num("-2 ** 2"), -4.0);
        assert_eq!(num("10 / 4"), 2.5);
        assert!(num("1 / 0").is_infinite());
    }

    #[test]
    fn plus_concatenates_with_strings() {
        assert_eq!(eval("values.qty + 1"), Value::from("41"));
        assert_eq!(eval("'Total ' + values.hours"), Value::from("Total 3"));
        assert_eq!(num("values.qty * 2"), 8.0);
        assert_eq!(num("+values.qty + 1"), 5.0);
        assert_eq!(num("values.rush + 1"), 2.0);
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(eval("values.notes || 'none'"), Value::from("none"));
        assert_eq!(eval("values.plan && values.hours"), Value::Number(3.0));
        assert_eq!(eval("!values.rush"), Value::Bool(false));
        assert_eq!(num("values.rush ? 50 : 0"), 50.0);
        assert_eq!(num("values.plan === 'pro' ? 2 : values.plan === 'basic' ? 1 : 0"), 2.0);
    }

    #[test]
    fn short_circuit_skips_errors() {
        assert_eq!(eval("false && nope"), Value::Bool(false));
        assert_eq!(eval("true || nope"), Value::Bool(true));
        assert_eq!(num("true ? 1 : nope"), 1.0);
    }

    #[test]
    fn equality() {
        assert_eq!(eval("values.qty == 4"), Value::Bool(true));
        assert_eq!(eval("values.qty === 4"), Value::Bool(false));
        assert_eq!(eval("values.qty !== '4'"), Value::Bool(false));
        assert_eq!(eval("null == undefined"), Value::Bool(true));
        assert_eq!(eval("null === undefined"), Value::Bool(false));
        assert_eq!(eval("null == 0"), Value::Bool(false));
        assert_eq!(eval("NaN == NaN"), Value::Bool(false));
        assert_eq!(eval("values.rush == 1"), Value::Bool(true));
        assert_eq!(eval("values == values"), Value::Bool(true));
    }

    #[test]
    fn comparison() {
        assert_eq!(eval("values.hours < values.rate"), Value::Bool(true));
        assert_eq!(eval("'b' > 'a'"), Value::Bool(true));
        assert_eq!(eval("'10' < '9'"), Value::Bool(true));
        assert_eq!(eval("'10' < 9"), Value::Bool(false));
        assert_eq!(eval("NaN <= NaN"), Value::Bool(false));
        assert_eq!(eval("3 >= 3"), Value::Bool(true));
    }

    #[test]
    fn math_functions() {
        assert_eq!(num("Math.max(values.hours, 5, 1)"), 5.0);
        assert_eq!(num("Math.min()"), f64::INFINITY);
        assert!(num("Math.max(1, NaN)").is_nan());
        assert_eq!(num("Math.round(2.5)"), 3.0);
        assert_eq!(num("Math.round(-2.5)"), -2.0);
        assert_eq!(num("Math.round(0.49999999999999994)"), 0.0);
        assert_eq!(num("Math.floor(-1.5)"), -2.0);
        assert_eq!(num("Math.ceil(1.2)"), 2.0);
        assert_eq!(num("Math.abs(-3)"), 3.0);
        assert_eq!(num("Math.pow(2, 10)"), 1024.0);
        assert_eq!(num("Math.sqrt(16)"), 4.0);
        assert_eq!(num("Math.trunc(-4.7)"), -4.0);
        assert!(num("Math.pow(1, Infinity)").is_nan());
        assert!((num("Math.PI") - std::f64::consts::PI).abs() < f64::EPSILON);
        assert!(num("Math.sqrt()").is_nan());
    }

    #[test]
    fn member_access() {
        assert_eq!(num("values['hours']"), 3.0);
        assert_eq!(eval("values.missing"), Value::Undefined);
        assert_eq!(num("values.plan.length"), 3.0);
        assert_eq!(eval("values.plan[0]"), Value::from("p"));
        assert_eq!(eval("values.hours.toFixed"), Value::Undefined);
        assert_eq!(eval("Math.nope"), Value::Undefined);
        assert_eq!(eval("values"), Value::Object);
    }

    #[test]
    fn runtime_errors() {
        assert_eq!(eval_err("window"), ExprError::Reference("window".to_string()));
        assert_eq!(
            eval_err("values.missing.deep"),
            ExprError::Type("Cannot read properties of undefined (reading 'deep')".to_string())
        );
        assert!(matches!(eval_err("null.x"), ExprError::Type(_)));
        assert_eq!(
            eval_err("values.hours(1)"),
            ExprError::Type("3 is not a function".to_string())
        );
        assert!(matches!(eval_err("Math.nope()"), ExprError::Type(_)));
        assert!(matches!(eval_err("Math.max(x)"), ExprError::Reference(_)));
    }
}
