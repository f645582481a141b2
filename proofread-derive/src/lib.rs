//! Derive macros for proofread
//!
//! This crate provides the `RequiredFields` derive, which generates the
//! non-empty check used to validate model output and incoming requests.

use proc_macro::TokenStream;
use quote::quote;
use syn::{meta::ParseNestedMeta, parse_macro_input, Data, DeriveInput, Fields, LitStr, Type};

/// Derives the `RequiredFields` trait for a struct with named fields.
///
/// Every `String` field is treated as required and reported by its wire name
/// when empty. Wire names follow `#[serde(rename_all = "...")]` on the struct
/// and `#[serde(rename = "...")]` on the field. Fields of any other type, and
/// fields marked `#[required(skip)]`, are not checked.
///
/// # Example
///
/// ```ignore
/// use proofread::contract::RequiredFields;
///
/// #[derive(RequiredFields)]
/// #[serde(rename_all = "camelCase")]
/// struct Reply {
///     corrected_text: String,
///     summary: String,
/// }
///
/// let reply = Reply { corrected_text: String::new(), summary: "ok".into() };
/// assert_eq!(reply.missing_fields(), vec!["correctedText"]);
/// ```
#[proc_macro_derive(RequiredFields, attributes(required))]
pub fn derive_required_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "RequiredFields can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "RequiredFields can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let rename_all = match serde_string_attr(&input.attrs, "rename_all") {
        Ok(value) => value,
        Err(err) => return err.to_compile_error().into(),
    };

    let mut checks = Vec::new();
    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if !is_string(&field.ty) || has_skip_attribute(&field.attrs) {
            continue;
        }

        let wire_name = match serde_string_attr(&field.attrs, "rename") {
            Ok(Some(renamed)) => renamed,
            Ok(None) => apply_rename_rule(&ident.to_string(), rename_all.as_deref()),
            Err(err) => return err.to_compile_error().into(),
        };

        checks.push(quote! {
            if self.#ident.is_empty() {
                missing.push(#wire_name);
            }
        });
    }

    let expanded = quote! {
        impl #impl_generics ::proofread::contract::RequiredFields for #name #ty_generics #where_clause {
            fn missing_fields(&self) -> ::std::vec::Vec<&'static str> {
                let mut missing = ::std::vec::Vec::new();
                #(#checks)*
                missing
            }
        }
    };

    TokenStream::from(expanded)
}

/// Check if a type is `String` (by last path segment).
fn is_string(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "String" && segment.arguments.is_empty()),
        _ => false,
    }
}

/// Check if a field has the #[required(skip)] attribute.
fn has_skip_attribute(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        if attr.path().is_ident("required") {
            if let Ok(meta_list) = attr.meta.require_list() {
                return meta_list.tokens.to_string().trim() == "skip";
            }
        }
        false
    })
}

/// Reads a string-valued key (e.g. `rename`) out of `#[serde(...)]` attributes.
///
/// Other serde keys are parsed and ignored.
fn serde_string_attr(attrs: &[syn::Attribute], key: &str) -> syn::Result<Option<String>> {
    let mut found = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) && meta.input.peek(syn::Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                found = Some(value.value());
                Ok(())
            } else {
                skip_meta_value(&meta)
            }
        })?;
    }

    Ok(found)
}

fn skip_meta_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta_value(&nested))?;
    }
    Ok(())
}

/// Converts a snake_case field name according to a serde `rename_all` rule.
fn apply_rename_rule(field: &str, rule: Option<&str>) -> String {
    match rule {
        Some("camelCase") => {
            let mut out = String::with_capacity(field.len());
            let mut upper_next = false;
            for ch in field.chars() {
                if ch == '_' {
                    upper_next = !out.is_empty();
                } else if upper_next {
                    out.extend(ch.to_uppercase());
                    upper_next = false;
                } else {
                    out.push(ch);
                }
            }
            out
        }
        Some("PascalCase") => {
            let camel = apply_rename_rule(field, Some("camelCase"));
            let mut chars = camel.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => camel,
            }
        }
        Some("lowercase") => field.replace('_', "").to_lowercase(),
        Some("UPPERCASE") => field.replace('_', "").to_uppercase(),
        Some("SCREAMING_SNAKE_CASE") => field.to_uppercase(),
        Some("kebab-case") => field.replace('_', "-"),
        _ => field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_rule() {
        assert_eq!(
            apply_rename_rule("corrected_text", Some("camelCase")),
            "correctedText"
        );
        assert_eq!(apply_rename_rule("summary", Some("camelCase")), "summary");
    }

    #[test]
    fn test_no_rule_keeps_name() {
        assert_eq!(apply_rename_rule("custom_prompt", None), "custom_prompt");
    }

    #[test]
    fn test_other_rules() {
        assert_eq!(apply_rename_rule("block_reason", Some("PascalCase")), "BlockReason");
        assert_eq!(apply_rename_rule("block_reason", Some("kebab-case")), "block-reason");
        assert_eq!(
            apply_rename_rule("block_reason", Some("SCREAMING_SNAKE_CASE")),
            "BLOCK_REASON"
        );
    }
}
