//! Scalar coercion shared by all field kinds.
//!
//! Upstream values arrive as JSON numbers, numeric strings (sometimes with a
//! comma decimal separator or grouping spaces), or junk. Anything that does
//! not parse is treated as absent.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Renders a scalar as trimmed text. Arrays are joined with `", "`.
#[must_use]
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean_text(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// Trims `raw` and drops characters XML 1.0 cannot carry (C0 controls other
/// than tab, newline and carriage return; U+FFFE; U+FFFF). `None` when
/// nothing is left.
#[must_use]
pub fn clean_text(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| is_xml_char(*c)).collect();
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Parses a non-negative decimal amount.
#[must_use]
pub fn decimal(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }?;
    (!parsed.is_sign_negative()).then_some(parsed)
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Parses a stock quantity. Negative quantities clamp to zero; fractional
/// quantities are truncated.
#[must_use]
pub fn stock(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Some(v)
            } else if n.as_i64().is_some() {
                // Only negative integers reach this branch.
                Some(0)
            } else {
                n.as_f64().and_then(truncate_quantity)
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(v) = trimmed.parse::<i64>() {
                Some(u64::try_from(v).unwrap_or(0))
            } else {
                trimmed
                    .replace(',', ".")
                    .parse::<f64>()
                    .ok()
                    .and_then(truncate_quantity)
            }
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate_quantity(v: f64) -> Option<u64> {
    if !v.is_finite() {
        return None;
    }
    Some(if v <= 0.0 { 0 } else { v.trunc() as u64 })
}
