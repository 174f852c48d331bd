//! # rusty-validate
//!
//! Declarative record validation with a derive macro and aggregated errors.
//!
//! ## Quick Start
//!
//! ```rust
//! use rusty_validate::{Category, Validate};
//!
//! #[derive(Validate)]
//! pub struct Signup {
//!     #[validate("len:8")]
//!     pub code: String,
//!
//!     #[validate("in:free,pro")]
//!     pub plan: String,
//!
//!     #[validate("min:18")]
//!     pub age: i32,
//!
//!     #[validate("max:3")]
//!     pub tags: Vec<String>,
//! }
//!
//! let signup = Signup {
//!     code: "ABCD1234".to_string(),
//!     plan: "enterprise".to_string(),
//!     age: 16,
//!     tags: vec!["new".to_string()],
//! };
//!
//! let errors = signup.validate().unwrap_err();
//! assert!(errors.contains(Category::In, "plan"));
//! assert!(errors.contains(Category::Min, "age"));
//! assert_eq!(errors.count(), 2);
//! ```
//!
//! ## Annotations
//!
//! - **`len:N`** - exact length of text (or of every element of a text sequence)
//! - **`in:a,b,c`** - value (or every element) must be one of the listed values
//! - **`min:N`** / **`max:N`** - inclusive bound on integers, or on text length
//!
//! Every annotated field is checked on each call; nothing stops at the first
//! failure. Annotations on non-`pub` fields, on unsupported field types, or
//! with malformed parameters are reported as violations rather than panics.
//!
//! ## Architecture
//!
//! - [`value`] - the `Record`/`Inspect` view generated by `#[derive(Validate)]`
//! - [`constraint`] - annotation parser
//! - [`rules`] - per-rule evaluators
//! - [`engine`] - field traversal
//! - [`error`] - violations and the aggregated error

// Lets the derive's `::rusty_validate::` paths resolve inside this crate
extern crate self as rusty_validate;

pub mod config;
pub mod constraint;
pub mod engine;
pub mod error;
pub mod logging;
pub mod rules;
pub mod value;

// Re-export derive macro (always available)
pub use rusty_validate_derive::Validate;

pub use config::{Config, LengthUnit, LoggingConfig, UnknownRulePolicy, ValidatorConfig};
pub use constraint::{AllowList, Constraint, Rule, SyntaxError};
pub use engine::{validate, Validator};
pub use error::{aggregate, Category, Measure, ValidationErrors, Violation, ViolationKind};
pub use value::{Element, Field, FieldKind, Inspect, Record, Value};

// Used by code generated from #[derive(Validate)]
#[doc(hidden)]
pub mod __private {
    pub use crate::value::{FieldRef, InspectField, OpaqueField};
}

/// Validation entry point for records.
///
/// Implemented for every type that implements [`Record`] and [`Inspect`],
/// which `#[derive(Validate)]` provides.
pub trait Validate {
    /// Validate with the default configuration
    fn validate(&self) -> Result<(), ValidationErrors>;

    /// Validate with an explicit validator
    fn validate_with(&self, validator: &Validator) -> Result<(), ValidationErrors>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl<T: Record + Inspect + ?Sized> Validate for T {
    fn validate(&self) -> Result<(), ValidationErrors> {
        engine::validate(self)
    }

    fn validate_with(&self, validator: &Validator) -> Result<(), ValidationErrors> {
        validator.validate(self)
    }
}
