//! Violations and the aggregated validation error
//!
//! Every failure found during one validation call becomes a [`Violation`].
//! They are collected in field declaration order and returned together as
//! a single [`ValidationErrors`], or not at all when the record is valid.

use crate::constraint::{Rule, SyntaxError};
use crate::value::FieldKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Failure category, the identity half of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    NotRecord,
    InaccessibleField,
    InvalidSyntax,
    UnsupportedKind,
    UnsupportedOperation,
    Len,
    In,
    Min,
    Max,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::NotRecord => "not_record",
            Category::InaccessibleField => "inaccessible_field",
            Category::InvalidSyntax => "invalid_syntax",
            Category::UnsupportedKind => "unsupported_kind",
            Category::UnsupportedOperation => "unsupported_operation",
            Category::Len => "len",
            Category::In => "in",
            Category::Min => "min",
            Category::Max => "max",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a `min`/`max` bound was compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Text length
    Length,
    /// Integer value
    Value,
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Length => write!(f, "length"),
            Measure::Value => write!(f, "value"),
        }
    }
}

/// A failure together with the context needed to describe it
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ViolationKind {
    #[error("expected a record, got {kind}")]
    NotRecord { kind: String },

    #[error("validation annotation on a non-public field")]
    InaccessibleField,

    #[error("invalid annotation `{annotation}`: {reason}")]
    InvalidSyntax {
        annotation: String,
        reason: SyntaxError,
    },

    #[error("{kind} fields cannot be validated")]
    UnsupportedKind { kind: String },

    #[error("`{rule}` is not defined for {kind} fields")]
    UnsupportedOperation { rule: Rule, kind: FieldKind },

    #[error("`{value}` has length {actual}, expected {expected}")]
    Len {
        value: String,
        expected: usize,
        actual: usize,
    },

    #[error("`{value}` is not one of: {}", .allowed.join(", "))]
    In { value: String, allowed: Vec<String> },

    #[error("{measure} {actual} is less than the minimum {bound}")]
    Min {
        measure: Measure,
        bound: i128,
        actual: i128,
    },

    #[error("{measure} {actual} is greater than the maximum {bound}")]
    Max {
        measure: Measure,
        bound: i128,
        actual: i128,
    },
}

impl ViolationKind {
    pub fn category(&self) -> Category {
        match self {
            ViolationKind::NotRecord { .. } => Category::NotRecord,
            ViolationKind::InaccessibleField => Category::InaccessibleField,
            ViolationKind::InvalidSyntax { .. } => Category::InvalidSyntax,
            ViolationKind::UnsupportedKind { .. } => Category::UnsupportedKind,
            ViolationKind::UnsupportedOperation { .. } => Category::UnsupportedOperation,
            ViolationKind::Len { .. } => Category::Len,
            ViolationKind::In { .. } => Category::In,
            ViolationKind::Min { .. } => Category::Min,
            ViolationKind::Max { .. } => Category::Max,
        }
    }
}

/// One failure, attributed to a field.
///
/// Identity is `(category, field)`. Record-level failures (`NotRecord`) have
/// an empty field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    field: String,
    #[serde(flatten)]
    kind: ViolationKind,
}

impl Violation {
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> &ViolationKind {
        &self.kind
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Check the failure category
    pub fn is(&self, category: Category) -> bool {
        self.category() == category
    }

    /// Check both halves of the violation's identity
    pub fn matches(&self, category: Category, field: &str) -> bool {
        self.is(category) && self.field == field
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.field, self.kind)
        }
    }
}

impl std::error::Error for Violation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Every violation found by one validation call.
///
/// Never empty: a call that finds nothing returns `Ok(())` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

/// Collapse collected violations into the call's result
pub fn aggregate(violations: Vec<Violation>) -> Result<(), ValidationErrors> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { violations })
    }
}

impl ValidationErrors {
    /// Violations in field declaration order
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Number of violations, always at least one
    pub fn count(&self) -> usize {
        self.violations.len()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn contains(&self, category: Category, field: &str) -> bool {
        self.iter().any(|v| v.matches(category, field))
    }

    pub fn get(&self, field: &str) -> Option<&Violation> {
        self.iter().find(|v| v.field() == field)
    }

    pub fn categories(&self) -> Vec<Category> {
        self.iter().map(Violation::category).collect()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.iter().map(Violation::field).collect()
    }

    /// Messages grouped by field name, for form-style rendering
    pub fn to_field_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for violation in &self.violations {
            map.entry(violation.field.clone())
                .or_default()
                .push(violation.kind.to_string());
        }
        map
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed with {} violation(s)", self.count())?;
        for violation in &self.violations {
            write!(f, "\n  {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
