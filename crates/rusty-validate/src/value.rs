// File: src/value.rs
// Purpose: Runtime view of records, their fields, and field values

use serde::Serialize;
use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A structural aggregate of named fields.
///
/// This trait is automatically implemented when you use `#[derive(Validate)]`,
/// but it can be written by hand for types whose shape is only known at runtime.
pub trait Record {
    /// Every declared field, in declaration order
    fn fields(&self) -> Vec<Field<'_>>;
}

/// One declared member of a record
#[derive(Debug)]
pub struct Field<'a> {
    /// Field name, used verbatim in violations
    pub name: &'static str,

    /// Whether the field is visible outside its declaring module (`pub`)
    pub visible: bool,

    /// Raw `#[validate("...")]` annotation, if any
    pub annotation: Option<&'static str>,

    /// Current value. Unannotated fields are not inspected and carry
    /// `Value::Other` with their type name.
    pub value: Value<'a>,
}

/// Borrowed, kind-tagged view of a value
#[derive(Clone)]
pub enum Value<'a> {
    Text(&'a str),
    Int(i128),
    TextSeq(Vec<&'a str>),
    IntSeq(Vec<i128>),
    Bool(bool),
    Record(&'a dyn Record),
    Map,
    /// Anything else, named by its type
    Other(&'static str),
}

impl<'a> Value<'a> {
    /// The field kind, if rules are defined for this value at all
    pub fn field_kind(&self) -> Option<FieldKind> {
        match self {
            Value::Text(_) => Some(FieldKind::Text),
            Value::Int(_) => Some(FieldKind::Int),
            Value::TextSeq(_) => Some(FieldKind::TextSeq),
            Value::IntSeq(_) => Some(FieldKind::IntSeq),
            Value::Bool(_) | Value::Record(_) | Value::Map | Value::Other(_) => None,
        }
    }

    /// Human-readable kind name used in violation messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Int(_) => "integer",
            Value::TextSeq(_) => "text sequence",
            Value::IntSeq(_) => "integer sequence",
            Value::Bool(_) => "bool",
            Value::Record(_) => "record",
            Value::Map => "map",
            Value::Other(name) => *name,
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::TextSeq(items) => f.debug_tuple("TextSeq").field(items).finish(),
            Value::IntSeq(items) => f.debug_tuple("IntSeq").field(items).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Record(record) => write!(f, "Record({} fields)", record.fields().len()),
            Value::Map => f.write_str("Map"),
            Value::Other(name) => f.debug_tuple("Other").field(name).finish(),
        }
    }
}

/// Field kinds the rules are defined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Int,
    TextSeq,
    IntSeq,
}

impl FieldKind {
    /// Whether list elements of this kind are parsed as integers
    pub fn is_integer(self) -> bool {
        matches!(self, FieldKind::Int | FieldKind::IntSeq)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Int => write!(f, "integer"),
            FieldKind::TextSeq => write!(f, "text sequence"),
            FieldKind::IntSeq => write!(f, "integer sequence"),
        }
    }
}

/// Maps a Rust value onto its `Value` view.
///
/// Implemented for strings, integers, sequences of either, `bool`, maps,
/// `dyn Any`, and every type deriving `Validate`.
pub trait Inspect {
    fn inspect(&self) -> Value<'_>;
}

/// Types that can appear as elements of a validated sequence
pub trait Element: Sized {
    fn sequence(items: &[Self]) -> Value<'_>;
}

// Every listed type converts to i128 without loss
macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl Inspect for $ty {
                fn inspect(&self) -> Value<'_> {
                    Value::Int(*self as i128)
                }
            }

            impl Element for $ty {
                fn sequence(items: &[Self]) -> Value<'_> {
                    Value::IntSeq(items.iter().map(|n| *n as i128).collect())
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl Inspect for str {
    fn inspect(&self) -> Value<'_> {
        Value::Text(self)
    }
}

impl Inspect for String {
    fn inspect(&self) -> Value<'_> {
        Value::Text(self.as_str())
    }
}

impl Inspect for Cow<'_, str> {
    fn inspect(&self) -> Value<'_> {
        Value::Text(self.as_ref())
    }
}

impl Element for String {
    fn sequence(items: &[Self]) -> Value<'_> {
        Value::TextSeq(items.iter().map(String::as_str).collect())
    }
}

impl<'s> Element for &'s str {
    fn sequence(items: &[Self]) -> Value<'_> {
        Value::TextSeq(items.to_vec())
    }
}

impl<T: Element> Inspect for [T] {
    fn inspect(&self) -> Value<'_> {
        T::sequence(self)
    }
}

impl<T: Element> Inspect for Vec<T> {
    fn inspect(&self) -> Value<'_> {
        T::sequence(self)
    }
}

impl<T: Element, const N: usize> Inspect for [T; N] {
    fn inspect(&self) -> Value<'_> {
        T::sequence(self)
    }
}

impl Inspect for bool {
    fn inspect(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl<K, V, S> Inspect for HashMap<K, V, S> {
    fn inspect(&self) -> Value<'_> {
        Value::Map
    }
}

impl<K, V> Inspect for BTreeMap<K, V> {
    fn inspect(&self) -> Value<'_> {
        Value::Map
    }
}

impl Inspect for dyn Any {
    fn inspect(&self) -> Value<'_> {
        Value::Other("dyn Any")
    }
}

impl Inspect for dyn Any + Send {
    fn inspect(&self) -> Value<'_> {
        Value::Other("dyn Any + Send")
    }
}

macro_rules! impl_other {
    ($($ty:ty),*) => {
        $(
            impl Inspect for $ty {
                fn inspect(&self) -> Value<'_> {
                    Value::Other(stringify!($ty))
                }
            }

            impl Element for $ty {
                fn sequence(_: &[Self]) -> Value<'_> {
                    Value::Other(concat!("[", stringify!($ty), "]"))
                }
            }
        )*
    };
}

// u128 values above i128::MAX have no integer view
impl_other!(f32, f64, char, u128, ());

impl Element for bool {
    fn sequence(_: &[Self]) -> Value<'_> {
        Value::Other("[bool]")
    }
}

impl<T> Inspect for Option<T> {
    fn inspect(&self) -> Value<'_> {
        Value::Other(std::any::type_name::<Self>())
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn inspect(&self) -> Value<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn inspect(&self) -> Value<'_> {
        (**self).inspect()
    }
}

/// Borrowed field handed to the `Validate` derive's generated code.
///
/// Calling `(&FieldRef(&field)).field_value()` with both [`InspectField`] and
/// [`OpaqueField`] in scope resolves to `Inspect::inspect` when the field type
/// implements [`Inspect`], and to `Value::Other(type_name)` otherwise, so an
/// annotated field of any type is reported at validation time.
#[doc(hidden)]
pub struct FieldRef<'a, T: ?Sized>(pub &'a T);

#[doc(hidden)]
pub trait InspectField<'a> {
    fn field_value(&self) -> Value<'a>;
}

impl<'a, T: Inspect + ?Sized> InspectField<'a> for FieldRef<'a, T> {
    fn field_value(&self) -> Value<'a> {
        let inner: &'a T = self.0;
        inner.inspect()
    }
}

#[doc(hidden)]
pub trait OpaqueField<'a> {
    fn field_value(&self) -> Value<'a>;
}

impl<'a, T: ?Sized> OpaqueField<'a> for &FieldRef<'a, T> {
    fn field_value(&self) -> Value<'a> {
        Value::Other(std::any::type_name::<T>())
    }
}
