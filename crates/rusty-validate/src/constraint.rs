//! Annotation parsing
//!
//! Turns a field's `#[validate("rule:params")]` string into a typed
//! [`Constraint`]. Parsing looks only at the field's declared kind, never
//! at its value.

use crate::value::FieldKind;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Rule tokens understood by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    Len,
    In,
    Min,
    Max,
}

impl Rule {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "len" => Some(Rule::Len),
            "in" => Some(Rule::In),
            "min" => Some(Rule::Min),
            "max" => Some(Rule::Max),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rule::Len => "len",
            Rule::In => "in",
            Rule::Min => "min",
            Rule::Max => "max",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed values of an `in` constraint, typed by the field kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList {
    Text(Vec<String>),
    Int(Vec<i128>),
}

impl AllowList {
    /// Allowed values rendered as text, in declaration order
    pub fn rendered(&self) -> Vec<String> {
        match self {
            AllowList::Text(values) => values.clone(),
            AllowList::Int(values) => values.iter().map(i128::to_string).collect(),
        }
    }
}

/// A parsed annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Exact length
    Len(usize),
    /// Membership in a fixed list
    In(AllowList),
    /// Inclusive lower bound (value for integers, length for text)
    Min(i128),
    /// Inclusive upper bound (value for integers, length for text)
    Max(i128),
}

impl Constraint {
    pub fn rule(&self) -> Rule {
        match self {
            Constraint::Len(_) => Rule::Len,
            Constraint::In(_) => Rule::In,
            Constraint::Min(_) => Rule::Min,
            Constraint::Max(_) => Rule::Max,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Len(n) => write!(f, "len:{}", n),
            Constraint::In(list) => write!(f, "in:{}", list.rendered().join(",")),
            Constraint::Min(n) => write!(f, "min:{}", n),
            Constraint::Max(n) => write!(f, "max:{}", n),
        }
    }
}

/// Why an annotation could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SyntaxError {
    #[error("expected `<rule>:<params>`")]
    MissingSeparator,

    #[error("unknown rule `{token}`")]
    UnknownRule { token: String },

    #[error("`{rule}` expects {expected}, got `{param}`")]
    BadParameter {
        rule: Rule,
        expected: &'static str,
        param: String,
    },

    #[error("`in` needs at least one allowed value")]
    EmptyList,
}

/// Parse an annotation for a field of the given kind
pub fn parse(kind: FieldKind, annotation: &str) -> Result<Constraint, SyntaxError> {
    let (token, param) = annotation
        .split_once(':')
        .ok_or(SyntaxError::MissingSeparator)?;

    let rule = Rule::from_token(token).ok_or_else(|| SyntaxError::UnknownRule {
        token: token.to_string(),
    })?;

    match rule {
        Rule::Len => parse_length(param).map(Constraint::Len),
        Rule::In => parse_allow_list(kind, param).map(Constraint::In),
        Rule::Min => parse_bound(rule, param).map(Constraint::Min),
        Rule::Max => parse_bound(rule, param).map(Constraint::Max),
    }
}

fn parse_length(param: &str) -> Result<usize, SyntaxError> {
    let bad = || SyntaxError::BadParameter {
        rule: Rule::Len,
        expected: "a non-negative integer",
        param: param.to_string(),
    };

    // usize::from_str tolerates a leading '+'
    if param.is_empty() || !param.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    param.parse().map_err(|_| bad())
}

fn parse_bound(rule: Rule, param: &str) -> Result<i128, SyntaxError> {
    parse_integer(param).ok_or_else(|| SyntaxError::BadParameter {
        rule,
        expected: "an integer",
        param: param.to_string(),
    })
}

fn parse_allow_list(kind: FieldKind, param: &str) -> Result<AllowList, SyntaxError> {
    if param.is_empty() {
        return Err(SyntaxError::EmptyList);
    }

    if !kind.is_integer() {
        return Ok(AllowList::Text(
            param.split(',').map(str::to_string).collect(),
        ));
    }

    param
        .split(',')
        .map(|item| {
            parse_integer(item).ok_or_else(|| SyntaxError::BadParameter {
                rule: Rule::In,
                expected: "a list of integers",
                param: item.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(AllowList::Int)
}

/// Signed decimal literal: optional sign, at least one digit, nothing else
fn parse_integer(s: &str) -> Option<i128> {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("len:20", Constraint::Len(20))]
    #[case("len:0", Constraint::Len(0))]
    #[case("min:10", Constraint::Min(10))]
    #[case("min:-10", Constraint::Min(-10))]
    #[case("max:+7", Constraint::Max(7))]
    #[case("max:-2", Constraint::Max(-2))]
    fn test_numeric_rules(#[case] annotation: &str, #[case] expected: Constraint) {
        assert_eq!(parse(FieldKind::Text, annotation), Ok(expected));
    }

    #[rstest]
    #[case("len:abcdef")]
    #[case("len:%12")]
    #[case("len:-6")]
    #[case("len:+6")]
    #[case("len:")]
    #[case("len:99999999999999999999999")]
    #[case("min:")]
    #[case("min:5-")]
    #[case("max:")]
    #[case("max:1.5")]
    #[case("max:-")]
    fn test_bad_parameters(#[case] annotation: &str) {
        assert!(matches!(
            parse(FieldKind::Int, annotation),
            Err(SyntaxError::BadParameter { .. })
        ));
    }

    #[test]
    fn test_in_follows_field_kind() {
        assert_eq!(
            parse(FieldKind::Int, "in:20,25,-30"),
            Ok(Constraint::In(AllowList::Int(vec![20, 25, -30])))
        );
        assert_eq!(
            parse(FieldKind::IntSeq, "in:12,-1,3"),
            Ok(Constraint::In(AllowList::Int(vec![12, -1, 3])))
        );
        assert_eq!(
            parse(FieldKind::Text, "in:foo,bar"),
            Ok(Constraint::In(AllowList::Text(vec![
                "foo".to_string(),
                "bar".to_string()
            ])))
        );
        // Text lists are taken verbatim, so numeric-looking junk is fine
        assert!(parse(FieldKind::TextSeq, "in:5-").is_ok());
    }

    #[test]
    fn test_in_rejects_bad_lists() {
        assert_eq!(parse(FieldKind::Text, "in:"), Err(SyntaxError::EmptyList));
        assert_eq!(parse(FieldKind::IntSeq, "in:"), Err(SyntaxError::EmptyList));
        assert!(matches!(
            parse(FieldKind::Int, "in:5-"),
            Err(SyntaxError::BadParameter { rule: Rule::In, .. })
        ));
        assert!(parse(FieldKind::Int, "in:1,two,3").is_err());
    }

    #[test]
    fn test_grammar_errors() {
        assert_eq!(
            parse(FieldKind::Text, "len20"),
            Err(SyntaxError::MissingSeparator)
        );
        assert_eq!(
            parse(FieldKind::Text, "regex:^a$"),
            Err(SyntaxError::UnknownRule {
                token: "regex".to_string()
            })
        );
    }

    #[test]
    fn test_display_round_trips_annotation() {
        let constraint = parse(FieldKind::Int, "in:-1,3").unwrap();
        assert_eq!(constraint.to_string(), "in:-1,3");
        assert_eq!(constraint.rule(), Rule::In);
    }
}
