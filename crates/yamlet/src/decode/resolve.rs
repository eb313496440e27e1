//! Type inference for bare, single-line scalars.

use std::sync::LazyLock;

use regex::Regex;

use crate::value::Value;

type Convert = fn(&str) -> Option<Value>;

struct Rule {
    pattern: Regex,
    convert: Convert,
}

fn null(_: &str) -> Option<Value> {
    Some(Value::Null)
}

fn yes(_: &str) -> Option<Value> {
    Some(Value::Bool(true))
}

fn no(_: &str) -> Option<Value> {
    Some(Value::Bool(false))
}

fn decimal(s: &str) -> Option<Value> {
    s.parse::<i64>().ok().map(Value::Int)
}

fn octal(s: &str) -> Option<Value> {
    i64::from_str_radix(&s[2..], 8).ok().map(Value::Int)
}

fn hex(s: &str) -> Option<Value> {
    i64::from_str_radix(&s[2..], 16).ok().map(Value::Int)
}

fn inf(_: &str) -> Option<Value> {
    Some(Value::Float(f64::INFINITY))
}

fn neg_inf(_: &str) -> Option<Value> {
    Some(Value::Float(f64::NEG_INFINITY))
}

fn nan(_: &str) -> Option<Value> {
    Some(Value::Float(f64::NAN))
}

fn float(s: &str) -> Option<Value> {
    s.parse::<f64>().ok().map(Value::Float)
}

// First rule whose pattern matches and whose converter accepts the text
// wins. A converter rejects only on overflow.
const RULES: &[(&str, Convert)] = &[
    (r"^(?:~|null|Null|NULL)?$", null),
    (r"^(?:true|True|TRUE)$", yes),
    (r"^(?:false|False|FALSE)$", no),
    (r"^[-+]?[0-9]+$", decimal),
    (r"^0o[0-7]+$", octal),
    (r"^0x[0-9a-fA-F]+$", hex),
    (r"^\+?\.(?:inf|Inf|INF)$", inf),
    (r"^-\.(?:inf|Inf|INF)$", neg_inf),
    (r"^\.(?:nan|NaN|NAN)$", nan),
    (
        r"^[-+]?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?)(?:[eE][-+]?[0-9]+)?$",
        float,
    ),
];

static TABLE: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|&(pattern, convert)| Rule {
            pattern: Regex::new(pattern).expect("valid scalar pattern"),
            convert,
        })
        .collect()
});

/// Classify `text` as null, bool, int or float, falling back to a string
/// holding `text` unchanged.
pub fn resolve_scalar(text: &str) -> Value {
    TABLE
        .iter()
        .filter(|rule| rule.pattern.is_match(text))
        .find_map(|rule| (rule.convert)(text))
        .unwrap_or_else(|| Value::Str(text.to_string()))
}
