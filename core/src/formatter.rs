//! Display formatting for raw feature values.

use crate::attribution::FeatureValue;

/// Shown for missing and null values.
pub const PLACEHOLDER: &str = "—";

const CURRENCY_SYMBOL: &str = "$";
/// Magnitudes strictly above this render as whole-number currency.
const CURRENCY_THRESHOLD: f64 = 1000.0;
const MAX_TEXT_CHARS: usize = 20;
const TRUNCATED_CHARS: usize = 18;
const ELLIPSIS: &str = "...";

/// Render a raw value for display. Never fails: anything that does not
/// parse as a number is treated as text.
pub fn format_value(value: Option<&FeatureValue>) -> String {
    match value {
        None => PLACEHOLDER.to_string(),
        Some(FeatureValue::Bool(true)) => "Yes".to_string(),
        Some(FeatureValue::Bool(false)) => "No".to_string(),
        Some(FeatureValue::Number(n)) if n.is_finite() => format_number(*n),
        Some(FeatureValue::Number(n)) => n.to_string(),
        Some(FeatureValue::Text(s)) => match parse_number(s) {
            Some(n) => format_number(n),
            None => truncate(s),
        },
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_number(n: f64) -> String {
    if n.abs() > CURRENCY_THRESHOLD {
        format_currency(n)
    } else if n.fract() == 0.0 {
        // -0.0 prints as "0"
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
    }
}

/// Whole-number currency with thousands separators, e.g. `$1,500`.
pub fn format_currency(n: f64) -> String {
    let whole = n.abs().round();
    let digits = format!("{whole:.0}");
    let sign = if n < 0.0 && whole > 0.0 { "-" } else { "" };
    format!("{sign}{CURRENCY_SYMBOL}{}", group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn truncate(s: &str) -> String {
    if s.chars().count() > MAX_TEXT_CHARS {
        let head: String = s.chars().take(TRUNCATED_CHARS).collect();
        format!("{head}{ELLIPSIS}")
    } else {
        s.to_string()
    }
}
