// File: rusty-validate-derive/src/validation.rs
// Purpose: Validate derive macro and #[validate] attribute processing

use proc_macro2::{Ident, TokenStream, TokenTree};
use quote::{quote, ToTokens};
use syn::ext::IdentExt;
use syn::{
    parse_quote, Attribute, Data, DeriveInput, Expr, ExprLit, Field, Index, Lit, LitStr, Member,
    Meta, Type, Visibility,
};

/// Parse the `#[validate("...")]` annotation of a field, if any.
///
/// Only the shape of the attribute is checked here; the annotation text
/// itself is parsed when the record is validated.
pub fn extract_annotation(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut found: Option<LitStr> = None;

    for attr in attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }

        let annotation = match &attr.meta {
            Meta::List(list) => list.parse_args::<LitStr>()?,
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => s.clone(),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "expected a string literal annotation",
                    ))
                }
            },
            Meta::Path(path) => {
                return Err(syn::Error::new_spanned(
                    path,
                    r#"expected #[validate("rule:params")]"#,
                ))
            }
        };

        if found.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "a field takes at most one #[validate] annotation",
            ));
        }
        found = Some(annotation);
    }

    Ok(found)
}

/// Generate `Record` and `Inspect` implementations for a struct.
///
/// An annotated field whose type mentions a type parameter adds a
/// `FieldType: Inspect` bound to both impls.
pub fn impl_validate(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) => {
            return Err(syn::Error::new_spanned(
                data.enum_token,
                "Validate can only be derived for structs",
            ))
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "Validate can only be derived for structs",
            ))
        }
    };

    let type_params: Vec<&Ident> = input.generics.type_params().map(|p| &p.ident).collect();
    let mut generics = input.generics.clone();

    // Report every bad attribute at once rather than one per compile
    let mut error: Option<syn::Error> = None;
    let mut descriptors = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let annotation = match extract_annotation(&field.attrs) {
            Ok(annotation) => annotation,
            Err(err) => {
                match error.as_mut() {
                    Some(existing) => existing.combine(err),
                    None => error = Some(err),
                }
                continue;
            }
        };

        if annotation.is_some() && mentions_any(&field.ty, &type_params) {
            let ty = &field.ty;
            generics
                .make_where_clause()
                .predicates
                .push(parse_quote!(#ty: ::rusty_validate::Inspect));
        }
        descriptors.push(field_descriptor(index, field, annotation));
    }

    if let Some(err) = error {
        return Err(err);
    }

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::rusty_validate::Record for #name #ty_generics #where_clause {
            fn fields(&self) -> ::std::vec::Vec<::rusty_validate::Field<'_>> {
                ::std::vec![#(#descriptors),*]
            }
        }

        impl #impl_generics ::rusty_validate::Inspect for #name #ty_generics #where_clause {
            fn inspect(&self) -> ::rusty_validate::Value<'_> {
                ::rusty_validate::Value::Record(self)
            }
        }
    })
}

/// Whether any of `idents` appears anywhere in the type
fn mentions_any(ty: &Type, idents: &[&Ident]) -> bool {
    fn walk(tokens: TokenStream, idents: &[&Ident]) -> bool {
        tokens.into_iter().any(|token| match token {
            TokenTree::Ident(ident) => idents.iter().any(|param| **param == ident),
            TokenTree::Group(group) => walk(group.stream(), idents),
            _ => false,
        })
    }

    !idents.is_empty() && walk(ty.to_token_stream(), idents)
}

/// Build the `Field { .. }` expression for one struct field.
///
/// Unannotated fields are not inspected. Annotated fields whose type has no
/// `Inspect` impl are described by their type name and fail validation as an
/// unsupported kind.
fn field_descriptor(index: usize, field: &Field, annotation: Option<LitStr>) -> TokenStream {
    let (member, name) = match &field.ident {
        Some(ident) => (Member::Named(ident.clone()), ident.unraw().to_string()),
        None => (Member::Unnamed(Index::from(index)), index.to_string()),
    };
    let visible = matches!(field.vis, Visibility::Public(_));
    let ty = &field.ty;

    match annotation {
        Some(annotation) => quote! {
            ::rusty_validate::Field {
                name: #name,
                visible: #visible,
                annotation: ::core::option::Option::Some(#annotation),
                value: {
                    #[allow(unused_imports)]
                    use ::rusty_validate::__private::{InspectField as _, OpaqueField as _};
                    (&::rusty_validate::__private::FieldRef(&self.#member)).field_value()
                },
            }
        },
        None => quote! {
            ::rusty_validate::Field {
                name: #name,
                visible: #visible,
                annotation: ::core::option::Option::None,
                value: ::rusty_validate::Value::Other(::core::any::type_name::<#ty>()),
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: DeriveInput) -> String {
        impl_validate(&input).unwrap().to_string()
    }

    #[test]
    fn test_named_fields() {
        let output = render(parse_quote! {
            pub struct Form {
                #[validate("len:20")]
                pub token: String,
                secret: String,
            }
        });

        assert!(output.contains("Record for Form"));
        assert!(output.contains("name : \"token\""));
        assert!(output.contains("Some (\"len:20\")"));
        assert!(output.contains("visible : false"));
        assert!(output.contains("type_name :: < String >"));
    }

    #[test]
    fn test_raw_identifiers_are_unescaped() {
        let output = render(parse_quote! {
            pub struct Item {
                #[validate("in:a,b")]
                pub r#type: String,
            }
        });

        assert!(output.contains("name : \"type\""));
        assert!(output.contains("self . r#type"));
    }

    #[test]
    fn test_tuple_fields_use_positions() {
        let output = render(parse_quote! {
            pub struct Pair(#[validate("min:0")] pub i32, pub i32);
        });

        assert!(output.contains("name : \"0\""));
        assert!(output.contains("self . 0"));
        assert!(output.contains("name : \"1\""));
    }

    #[test]
    fn test_generics_are_forwarded() {
        let output = render(parse_quote! {
            pub struct Borrowed<'a> {
                #[validate("len:3")]
                pub code: &'a str,
            }
        });

        assert!(output.contains("Record for Borrowed < 'a >"));
        assert!(!output.contains("where"));
    }

    #[test]
    fn test_annotated_type_params_are_bounded() {
        let output = render(parse_quote! {
            pub struct Holder<T, U> {
                #[validate("len:2")]
                pub items: Vec<T>,
                pub extra: U,
            }
        });

        assert_eq!(
            output.matches("Vec < T > : :: rusty_validate :: Inspect").count(),
            2
        );
        assert!(!output.contains("U : :: rusty_validate :: Inspect"));
    }

    #[test]
    fn test_type_param_detection() {
        let t: Ident = parse_quote!(T);
        let params = [&t];

        assert!(mentions_any(&parse_quote!(T), &params));
        assert!(mentions_any(&parse_quote!(Option<Vec<T>>), &params));
        assert!(mentions_any(&parse_quote!([T; 3]), &params));
        assert!(!mentions_any(&parse_quote!(Vec<Tag>), &params));
        assert!(!mentions_any(&parse_quote!(&'a str), &[]));
    }

    #[test]
    fn test_enums_are_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Choice { A, B }
        };
        let err = impl_validate(&input).unwrap_err();
        assert_eq!(err.to_string(), "Validate can only be derived for structs");
    }

    #[test]
    fn test_attribute_shape_errors() {
        let input: DeriveInput = parse_quote! {
            pub struct Bad {
                #[validate("len:1")]
                #[validate("len:2")]
                pub twice: String,
                #[validate]
                pub bare: String,
                #[validate(len = 3)]
                pub not_a_string: String,
            }
        };
        let err = impl_validate(&input).unwrap_err();
        assert_eq!(err.into_iter().count(), 3);
    }

    #[test]
    fn test_name_value_form() {
        let field: syn::Field = parse_quote! {
            #[validate = "max:5"]
            pub size: i32
        };
        let annotation = extract_annotation(&field.attrs).unwrap().unwrap();
        assert_eq!(annotation.value(), "max:5");
    }
}
