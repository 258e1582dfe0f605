use probeql_ast::{BinaryExpr, BinaryOp, Expression, FunctionCall, UnaryOp};
use probeql_event::Event;
use probeql_fields::resolve_field;
use probeql_types::{compare_values, slice_contains, values_equal, Value};
use regex::Regex;
use std::cmp::Ordering;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Evaluate a compiled expression against one event.
///
/// A panic inside a single evaluation is isolated here so a defective
/// rule cannot take down the stream worker that runs it.
pub fn evaluate(expr: &Expression, evt: &Event) -> bool {
    match catch_unwind(AssertUnwindSafe(|| eval_bool(expr, evt))) {
        Ok(verdict) => verdict,
        Err(_) => {
            log::error!("evaluation of {} panicked, treating as non-match", expr);
            false
        }
    }
}

/// Boolean verdict of a node. Anything that is not boolean true,
/// including a not-applicable field, contributes a non-match.
fn eval_bool(expr: &Expression, evt: &Event) -> bool {
    match expr {
        Expression::Unary(u) => match u.op {
            UnaryOp::Not => !eval_bool(&u.operand, evt),
        },
        Expression::Binary(b) if b.op.is_logical() => match b.op {
            BinaryOp::And => eval_bool(&b.lhs, evt) && eval_bool(&b.rhs, evt),
            BinaryOp::Or => eval_bool(&b.lhs, evt) || eval_bool(&b.rhs, evt),
            _ => unreachable!(),
        },
        Expression::Binary(b) => eval_comparison(b, evt),
        other => eval_value(other, evt).is_some_and(|v| v.is_true()),
    }
}

/// Value of a node, or `None` when any input it needs is absent from
/// this event.
fn eval_value(expr: &Expression, evt: &Event) -> Option<Value> {
    match expr {
        Expression::Literal(lit) => Some(lit.to_value()),
        Expression::Field(field) => resolve_field(field, evt),
        Expression::List(items) => {
            let values = items
                .iter()
                .map(|item| eval_value(item, evt))
                .collect::<Option<Vec<_>>>()?;
            Some(Value::Slice(values))
        }
        Expression::FunctionCall(call) => eval_function(call, evt),
        Expression::Unary(_) | Expression::Binary(_) => {
            Some(Value::Bool(eval_bool(expr, evt)))
        }
    }
}

fn eval_comparison(b: &BinaryExpr, evt: &Event) -> bool {
    let Some(lhs) = eval_value(&b.lhs, evt) else {
        return false;
    };
    let Some(rhs) = eval_value(&b.rhs, evt) else {
        return false;
    };

    match b.op {
        BinaryOp::Equal => values_equal(&lhs, &rhs),
        BinaryOp::NotEqual => !values_equal(&lhs, &rhs),
        BinaryOp::Less => matches!(compare_values(&lhs, &rhs), Some(Ordering::Less)),
        BinaryOp::LessOrEqual => matches!(
            compare_values(&lhs, &rhs),
            Some(Ordering::Less | Ordering::Equal)
        ),
        BinaryOp::Greater => matches!(compare_values(&lhs, &rhs), Some(Ordering::Greater)),
        BinaryOp::GreaterOrEqual => matches!(
            compare_values(&lhs, &rhs),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        BinaryOp::In => lhs_in(&lhs, &rhs),
        BinaryOp::Contains => contains(&lhs, &rhs),
        BinaryOp::StartsWith => string_pair(&lhs, &rhs)
            .is_some_and(|(l, r)| l.starts_with(&r)),
        BinaryOp::EndsWith => string_pair(&lhs, &rhs)
            .is_some_and(|(l, r)| l.ends_with(&r)),
        BinaryOp::Matches => regex_match(&lhs, &rhs),
        BinaryOp::And | BinaryOp::Or => unreachable!(),
    }
}

fn lhs_in(lhs: &Value, rhs: &Value) -> bool {
    rhs.as_slice().is_some_and(|items| slice_contains(items, lhs))
}

/// `contains` over a slice field tests membership; over anything else
/// it is a substring test on the string forms.
fn contains(lhs: &Value, rhs: &Value) -> bool {
    if let Some(items) = lhs.as_slice() {
        return slice_contains(items, rhs);
    }
    string_pair(lhs, rhs).is_some_and(|(l, r)| l.contains(&r))
}

fn string_pair(lhs: &Value, rhs: &Value) -> Option<(String, String)> {
    Some((lhs.string_form()?, rhs.string_form()?))
}

/// The pattern is compiled per evaluation; a malformed pattern is a
/// runtime anomaly, logged and treated as a non-match.
fn regex_match(lhs: &Value, rhs: &Value) -> bool {
    let Some((subject, pattern)) = string_pair(lhs, rhs) else {
        return false;
    };
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(&subject),
        Err(err) => {
            log::warn!("invalid pattern {}: {}", pattern, err);
            false
        }
    }
}

fn eval_function(call: &FunctionCall, evt: &Event) -> Option<Value> {
    let args = call
        .args
        .iter()
        .map(|arg| eval_value(arg, evt))
        .collect::<Option<Vec<_>>>()?;
    match (call.def.call)(&args) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("{} call failed: {}", call.def.name, err);
            None
        }
    }
}
