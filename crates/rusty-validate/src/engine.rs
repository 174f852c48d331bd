// File: src/engine.rs
// Purpose: Walk a record's fields, dispatch to parser and rules, collect violations

use crate::config::{UnknownRulePolicy, ValidatorConfig};
use crate::constraint::{self, SyntaxError};
use crate::error::{aggregate, ValidationErrors, Violation, ViolationKind};
use crate::rules;
use crate::value::{Field, Inspect, Value};
use tracing::{debug, instrument, trace, warn};

/// Validates records according to a [`ValidatorConfig`].
///
/// Holds no state besides its configuration, so one instance can be shared
/// freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate every annotated field of `value`.
    ///
    /// Returns `Ok(())` when nothing failed; otherwise all violations, in field
    /// declaration order. A value that is not a record yields a single
    /// `NotRecord` violation and no field is examined.
    #[instrument(level = "debug", skip_all, fields(value = std::any::type_name::<T>()))]
    pub fn validate<T: Inspect + ?Sized>(&self, value: &T) -> Result<(), ValidationErrors> {
        let record = match value.inspect() {
            Value::Record(record) => record,
            other => {
                debug!(kind = other.kind_name(), "value is not a record");
                return aggregate(vec![Violation::new(
                    "",
                    ViolationKind::NotRecord {
                        kind: other.kind_name().to_string(),
                    },
                )]);
            }
        };

        let violations: Vec<Violation> = record
            .fields()
            .iter()
            .filter_map(|field| self.check_field(field))
            .collect();

        debug!(violations = violations.len(), "validation finished");
        aggregate(violations)
    }

    fn check_field(&self, field: &Field<'_>) -> Option<Violation> {
        let Some(annotation) = field.annotation else {
            trace!(field = field.name, "no annotation, skipping");
            return None;
        };

        match self.check_annotated(field, annotation) {
            Ok(()) => None,
            Err(kind) => {
                debug!(field = field.name, category = %kind.category(), "{}", kind);
                Some(Violation::new(field.name, kind))
            }
        }
    }

    fn check_annotated(&self, field: &Field<'_>, annotation: &str) -> Result<(), ViolationKind> {
        if !field.visible {
            return Err(ViolationKind::InaccessibleField);
        }

        let kind = field
            .value
            .field_kind()
            .ok_or_else(|| ViolationKind::UnsupportedKind {
                kind: field.value.kind_name().to_string(),
            })?;

        let constraint = match constraint::parse(kind, annotation) {
            Ok(constraint) => constraint,
            Err(SyntaxError::UnknownRule { token })
                if self.config.unknown_rules == UnknownRulePolicy::Ignore =>
            {
                warn!(field = field.name, rule = %token, "ignoring unknown validation rule");
                return Ok(());
            }
            Err(reason) => {
                return Err(ViolationKind::InvalidSyntax {
                    annotation: annotation.to_string(),
                    reason,
                })
            }
        };

        rules::evaluate(&constraint, &field.value, self.config.length_unit)
    }
}

/// Validate `value` with the default configuration
pub fn validate<T: Inspect + ?Sized>(value: &T) -> Result<(), ValidationErrors> {
    Validator::default().validate(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LengthUnit;
    use crate::error::Category;
    use crate::value::Record;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Hand-written record: one field per (name, visible, annotation, value)
    struct Manual {
        fields: Vec<(&'static str, bool, Option<&'static str>, String)>,
    }

    impl Record for Manual {
        fn fields(&self) -> Vec<Field<'_>> {
            self.fields
                .iter()
                .map(|(name, visible, annotation, value)| Field {
                    name: *name,
                    visible: *visible,
                    annotation: *annotation,
                    value: value.inspect(),
                })
                .collect()
        }
    }

    impl Inspect for Manual {
        fn inspect(&self) -> Value<'_> {
            Value::Record(self)
        }
    }

    fn summary(result: Result<(), ValidationErrors>) -> Vec<(Category, String)> {
        match result {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .into_iter()
                .map(|v| (v.category(), v.field().to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_validator_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }

    #[test]
    fn test_non_records_short_circuit() {
        let errors = validate("some string").unwrap_err();
        assert_eq!(errors.count(), 1);
        assert!(errors.contains(Category::NotRecord, ""));

        let map: HashMap<String, String> = HashMap::new();
        assert_eq!(
            summary(validate(&map)),
            vec![(Category::NotRecord, String::new())]
        );
    }

    #[test]
    fn test_every_field_is_checked() {
        let record = Manual {
            fields: vec![
                ("Plain", true, None, "anything".into()),
                ("Hidden", false, Some("len:3"), "abc".into()),
                ("Short", true, Some("len:5"), "abc".into()),
                ("Broken", true, Some("len:%12"), "abc".into()),
                ("Fine", true, Some("max:3"), "abc".into()),
            ],
        };

        assert_eq!(
            summary(validate(&record)),
            vec![
                (Category::InaccessibleField, "Hidden".to_string()),
                (Category::Len, "Short".to_string()),
                (Category::InvalidSyntax, "Broken".to_string()),
            ]
        );
    }

    #[test]
    fn test_unannotated_private_fields_are_skipped() {
        let record = Manual {
            fields: vec![("hidden", false, None, "x".into())],
        };
        assert!(validate(&record).is_ok());
    }

    #[test]
    fn test_unknown_rule_policy() {
        let record = Manual {
            fields: vec![("Name", true, Some("regex:^a"), "b".into())],
        };

        assert_eq!(
            summary(validate(&record)),
            vec![(Category::InvalidSyntax, "Name".to_string())]
        );

        let lenient = Validator::new(ValidatorConfig {
            unknown_rules: UnknownRulePolicy::Ignore,
            ..ValidatorConfig::default()
        });
        assert!(lenient.validate(&record).is_ok());
    }

    #[test]
    fn test_length_unit_is_applied() {
        let record = Manual {
            fields: vec![("Word", true, Some("len:5"), "héllo".into())],
        };
        assert!(validate(&record).is_ok());

        let bytes = Validator::new(ValidatorConfig {
            length_unit: LengthUnit::Bytes,
            ..ValidatorConfig::default()
        });
        assert_eq!(
            summary(bytes.validate(&record)),
            vec![(Category::Len, "Word".to_string())]
        );
    }

    #[test]
    fn test_repeated_calls_agree() {
        let record = Manual {
            fields: vec![
                ("A", true, Some("in:x,y"), "z".into()),
                ("B", true, Some("min:"), "z".into()),
            ],
        };
        assert_eq!(validate(&record), validate(&record));
    }
}
