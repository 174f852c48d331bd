// Procedural macros for rusty-validate

use proc_macro::TokenStream;

use syn::{parse_macro_input, DeriveInput};

mod validation;

/// Derive macro for record validation
///
/// Generates `Record` and `Inspect` implementations describing the struct's
/// fields, their visibility, and their `#[validate("...")]` annotations. The
/// blanket `Validate` trait then provides `.validate()`.
///
/// # Example
///
/// ```ignore
/// use rusty_validate::Validate;
///
/// #[derive(Validate)]
/// pub struct CreateUserRequest {
///     #[validate("len:20")]
///     pub token: String,
///
///     #[validate("in:admin,user")]
///     pub role: String,
///
///     #[validate("min:18")]
///     pub age: i32,
///
///     #[validate("max:32")]
///     pub tags: Vec<String>,
///
///     pub bio: Option<String>,  // Unannotated fields are never inspected
/// }
/// ```
///
/// # Available Annotations
///
/// - `#[validate("len:N")]` - Exact length (text, text sequences)
/// - `#[validate("in:a,b")]` - Membership (text, integers, sequences of either)
/// - `#[validate("min:N")]` - Inclusive minimum (integer value or text length)
/// - `#[validate("max:N")]` - Inclusive maximum (integer value or text length)
///
/// The annotation string is checked at validation time, not at compile time:
/// a malformed annotation is reported as a violation on its field. So is an
/// annotation on a field whose type has no `Inspect` impl (`Vec<bool>`,
/// `HashSet<String>`, a struct that does not derive `Validate`).
///
/// # Generic structs
///
/// An annotated field whose type mentions a type parameter adds a
/// `FieldType: Inspect` bound to the generated impls, so `Holder<T>` with an
/// annotated `pub items: Vec<T>` only implements `Validate` when
/// `Vec<T>: Inspect`.
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    validation::impl_validate(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
