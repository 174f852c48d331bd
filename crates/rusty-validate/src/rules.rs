//! Rule evaluators
//!
//! Each rule is an exhaustive match over the field's value. Sequences are
//! checked element by element and stop at the first failing element, so a
//! field yields at most one failure.

use crate::config::LengthUnit;
use crate::constraint::{AllowList, Constraint, Rule};
use crate::error::{Measure, ViolationKind};
use crate::value::{FieldKind, Value};

/// Check a value against a parsed constraint
pub fn evaluate(
    constraint: &Constraint,
    value: &Value<'_>,
    unit: LengthUnit,
) -> Result<(), ViolationKind> {
    match constraint {
        Constraint::Len(expected) => check_len(*expected, value, unit),
        Constraint::In(allowed) => check_in(allowed, value),
        Constraint::Min(bound) => check_bound(Rule::Min, *bound, value, unit),
        Constraint::Max(bound) => check_bound(Rule::Max, *bound, value, unit),
    }
}

fn unsupported_kind(value: &Value<'_>) -> ViolationKind {
    ViolationKind::UnsupportedKind {
        kind: value.kind_name().to_string(),
    }
}

fn unsupported_operation(rule: Rule, kind: FieldKind) -> ViolationKind {
    ViolationKind::UnsupportedOperation { rule, kind }
}

fn check_len(expected: usize, value: &Value<'_>, unit: LengthUnit) -> Result<(), ViolationKind> {
    let exact = |s: &str| {
        let actual = unit.measure(s);
        if actual == expected {
            Ok(())
        } else {
            Err(ViolationKind::Len {
                value: s.to_string(),
                expected,
                actual,
            })
        }
    };

    match value {
        Value::Text(s) => exact(*s),
        Value::TextSeq(items) => items.iter().try_for_each(|s| exact(*s)),
        Value::Int(_) => Err(unsupported_operation(Rule::Len, FieldKind::Int)),
        Value::IntSeq(_) => Err(unsupported_operation(Rule::Len, FieldKind::IntSeq)),
        Value::Bool(_) | Value::Record(_) | Value::Map | Value::Other(_) => {
            Err(unsupported_kind(value))
        }
    }
}

fn check_in(allowed: &AllowList, value: &Value<'_>) -> Result<(), ViolationKind> {
    let rejected = |rendered: String| ViolationKind::In {
        value: rendered,
        allowed: allowed.rendered(),
    };

    match (allowed, value) {
        (AllowList::Text(list), Value::Text(s)) => member_text(list, s).map_err(rejected),
        (AllowList::Text(list), Value::TextSeq(items)) => items
            .iter()
            .try_for_each(|s| member_text(list, s))
            .map_err(rejected),
        (AllowList::Int(list), Value::Int(n)) => member_int(list, *n).map_err(rejected),
        (AllowList::Int(list), Value::IntSeq(items)) => items
            .iter()
            .try_for_each(|n| member_int(list, *n))
            .map_err(rejected),
        // List typed for a different kind than the value
        (_, other) => match other.field_kind() {
            Some(kind) => Err(unsupported_operation(Rule::In, kind)),
            None => Err(unsupported_kind(other)),
        },
    }
}

fn member_text(list: &[String], s: &str) -> Result<(), String> {
    if list.iter().any(|allowed| allowed == s) {
        Ok(())
    } else {
        Err(s.to_string())
    }
}

fn member_int(list: &[i128], n: i128) -> Result<(), String> {
    if list.contains(&n) {
        Ok(())
    } else {
        Err(n.to_string())
    }
}

fn check_bound(
    rule: Rule,
    bound: i128,
    value: &Value<'_>,
    unit: LengthUnit,
) -> Result<(), ViolationKind> {
    let within = |measure: Measure, actual: i128| {
        let ok = match rule {
            Rule::Min => actual >= bound,
            _ => actual <= bound,
        };
        if ok {
            Ok(())
        } else if rule == Rule::Min {
            Err(ViolationKind::Min {
                measure,
                bound,
                actual,
            })
        } else {
            Err(ViolationKind::Max {
                measure,
                bound,
                actual,
            })
        }
    };
    let length = |s: &str| i128::try_from(unit.measure(s)).unwrap_or(i128::MAX);

    match value {
        Value::Text(s) => within(Measure::Length, length(*s)),
        Value::TextSeq(items) => items
            .iter()
            .try_for_each(|s| within(Measure::Length, length(*s))),
        Value::Int(n) => within(Measure::Value, *n),
        Value::IntSeq(items) => items.iter().try_for_each(|n| within(Measure::Value, *n)),
        Value::Bool(_) | Value::Record(_) | Value::Map | Value::Other(_) => {
            Err(unsupported_kind(value))
        }
    }
}
