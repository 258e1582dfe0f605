//! Comparison and coercion rules between runtime values
//!
//! Cross-width integer comparisons widen through i128, mixed
//! integer/float comparisons go through f64, strings compare byte-wise
//! and IP values compare as addresses. An IP compared against a string
//! parses the string as an address for equality, or as a CIDR block for
//! subnet-aware equality. All of these are pure functions: a pair of
//! values that cannot be coerced to a common representation simply
//! yields `None`, which the evaluator turns into a non-match.

use crate::Value;
use ipnet::IpNet;
use std::cmp::Ordering;

/// Compare two values after coercing them to a common representation.
///
/// Returns `None` when no common representation exists. Equality-only
/// kinds (bool) order as equal/unequal via [`values_equal`] instead.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    // Integer/integer stays exact through i128
    if let (Some(x), Some(y)) = (a.as_i128(), b.as_i128()) {
        return Some(x.cmp(&y));
    }
    // Any numeric mix involving a float goes through f64
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Value::UnicodeString(x) | Value::AnsiString(x), Value::UnicodeString(y) | Value::AnsiString(y)) => {
            Some(x.as_bytes().cmp(y.as_bytes()))
        }
        (Value::Time(x), Value::Time(y)) => Some(x.cmp(y)),
        (Value::Ip(x), Value::Ip(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Kind-aware equality between two values.
///
/// On top of the ordering rules this adds the subnet-aware case: an IP
/// value equals a string operand when the string parses as the same
/// address, or when it parses as a CIDR block containing the address.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Ip(addr), other) | (other, Value::Ip(addr)) if other.as_str().is_some() => {
            let text = other.as_str().unwrap_or_default();
            if let Ok(parsed) = text.parse::<std::net::IpAddr>() {
                return *addr == parsed;
            }
            if let Ok(net) = text.parse::<IpNet>() {
                return net.contains(addr);
            }
            false
        }
        _ => compare_values(a, b) == Some(Ordering::Equal),
    }
}

/// Membership test: does `needle` equal any element of `haystack`?
pub fn slice_contains(haystack: &[Value], needle: &Value) -> bool {
    haystack.iter().any(|item| values_equal(item, needle))
}
