//! Variant-change payload normalization.
//!
//! The inbound variant-change notification carries a price in one of
//! several shapes depending on the upstream emitter. Precedence:
//!
//! 1. flat integer `price` (already minor units)
//! 2. nested `price.amount` (decimal currency units, number or string)
//! 3. `compare_at_price`, same two shapes
//!
//! Anything negative or unparseable normalizes to 0. If the upstream
//! payload shape changes beyond these three, this parser will silently
//! report 0 rather than guess.

use serde_json::Value;

/// Extract a non-negative minor-currency-unit price from a
/// variant-change payload.
pub fn price_cents(payload: &Value) -> u64 {
    flat_cents(payload.get("price"))
        .or_else(|| nested_amount(payload.get("price")))
        .or_else(|| flat_cents(payload.get("compare_at_price")))
        .or_else(|| nested_amount(payload.get("compare_at_price")))
        .unwrap_or(0)
}

fn flat_cents(value: Option<&Value>) -> Option<u64> {
    value?.as_i64().filter(|n| *n >= 0).map(|n| n as u64)
}

fn nested_amount(value: Option<&Value>) -> Option<u64> {
    let amount = value?.get("amount")?;
    let units = match amount {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !units.is_finite() || units < 0.0 {
        return None;
    }
    Some((units * 100.0).round() as u64)
}
