//! `#[derive(Captures)]`: generate capture accessors for structs and enums.
//!
//! Structs get `CaptureTarget` (field lookup by group-name segment) and a
//! nesting `FieldSlot`, so they can sit behind `Option<_>` fields of other
//! targets. C-like enums get `FromCapture` (by variant name or discriminant)
//! and a scalar `FieldSlot`.
//!
//! # Container attributes
//! - `#[capture(rename_all = "...")]`: rename every field or variant
//! - `#[capture(no_default)]`: the struct has no `Default`, so an unset
//!   `Option<_>` of it cannot be created on demand
//!
//! # Field attributes
//! - `#[capture(skip)]`: field is not writable
//! - `#[capture(name = "...")]`: name used in group names
//! - `#[capture(factory = "path::to::fn")]`: build an unset `Option<T>`
//!   object with `fn() -> Result<T, E>` instead of `T::default()`
//!
//! # Variant attributes
//! - `#[capture(name = "...")]`: name matched instead of the variant ident

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, Token, punctuated::Punctuated};

use crate::type_utils::{RENAME_RULES, apply_rename_rule, normalize_type, option_inner};

/// Internal field metadata collected during parsing.
struct FieldInfo {
    ident: Ident,
    ty: syn::Type,
    group_name: String,
    factory: Option<Factory>,
}

struct Factory {
    path: syn::ExprPath,
    object_ty: syn::Type,
}

/// Options read from `#[capture(...)]`.
#[derive(Default)]
struct CaptureAttrs {
    skip: bool,
    no_default: bool,
    name: Option<String>,
    factory: Option<syn::ExprPath>,
    rename_all: Option<syn::LitStr>,
}

/// Entry point for `#[derive(Captures)]`.
pub fn derive_captures_impl(input: DeriveInput) -> TokenStream {
    let result = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => derive_struct(&input, &fields.named),
            _ => Err(syn::Error::new_spanned(
                &input.ident,
                "Captures can only be derived for structs with named fields",
            )),
        },
        Data::Enum(data) => derive_enum(&input, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Captures can only be derived for structs and C-like enums",
        )),
    };

    match result {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

// ==================== Attribute parsing ====================

fn parse_capture_attrs(attrs: &[syn::Attribute]) -> syn::Result<CaptureAttrs> {
    let mut out = CaptureAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("capture") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                out.skip = true;
            } else if meta.path.is_ident("no_default") {
                out.no_default = true;
            } else if meta.path.is_ident("name") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                out.name = Some(lit.value());
            } else if meta.path.is_ident("rename_all") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                if !RENAME_RULES.contains(&lit.value().as_str()) {
                    return Err(syn::Error::new_spanned(
                        &lit,
                        format!("unknown rename rule, expected one of {:?}", RENAME_RULES),
                    ));
                }
                out.rename_all = Some(lit);
            } else if meta.path.is_ident("factory") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                out.factory = Some(lit.parse()?);
            } else {
                return Err(meta.error("unknown capture attribute"));
            }
            Ok(())
        })?;
    }
    Ok(out)
}

/// Explicit `name` wins, then the container's `rename_all`, then the ident.
fn display_name(explicit: Option<String>, ident: &str, rename_all: Option<&str>) -> String {
    explicit
        .or_else(|| rename_all.and_then(|rule| apply_rename_rule(ident, rule)))
        .unwrap_or_else(|| ident.trim_start_matches("r#").to_owned())
}

// ==================== Structs ====================

fn derive_struct(
    input: &DeriveInput,
    fields: &Punctuated<syn::Field, Token![,]>,
) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let type_name_str = name.to_string();
    let container = parse_capture_attrs(&input.attrs)?;
    let rename_all = container.rename_all.map(|lit| lit.value());

    let mut field_infos: Vec<FieldInfo> = Vec::new();
    for field in fields.iter() {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_capture_attrs(&field.attrs)?;
        let is_pub = matches!(field.vis, syn::Visibility::Public(_));
        if attrs.skip || !is_pub {
            continue;
        }

        let factory = match attrs.factory {
            Some(path) => {
                let Some(object_ty) = option_inner(&field.ty) else {
                    return Err(syn::Error::new_spanned(
                        &field.ty,
                        "#[capture(factory = ...)] requires an Option<T> field",
                    ));
                };
                Some(Factory {
                    path,
                    object_ty: object_ty.clone(),
                })
            }
            None => None,
        };

        field_infos.push(FieldInfo {
            ident: ident.clone(),
            ty: field.ty.clone(),
            group_name: display_name(attrs.name, &ident.to_string(), rename_all.as_deref()),
            factory,
        });
    }

    // Generate descend match arms
    let descend_arms = field_infos.iter().map(|f| {
        let ident = &f.ident;
        let group_name = &f.group_name;
        match &f.factory {
            Some(factory) => {
                let path = &factory.path;
                quote! { #group_name => capmap::target::descend_with(&mut self.#ident, #path), }
            }
            None => quote! {
                #group_name => capmap::target::FieldSlot::descend(&mut self.#ident),
            },
        }
    });

    // Generate apply match arms
    let apply_arms = field_infos.iter().map(|f| {
        let ident = &f.ident;
        let group_name = &f.group_name;
        match &f.factory {
            Some(factory) => {
                let object_name = normalize_type(&factory.object_ty);
                quote! { #group_name => Some(cx.place(&mut self.#ident, #object_name)), }
            }
            None => quote! { #group_name => Some(cx.write(&mut self.#ident)), },
        }
    });

    let field_name_strs: Vec<&String> = field_infos.iter().map(|f| &f.group_name).collect();

    // Generic structs need every field type to be a slot (or a target, for factories)
    let mut generics = input.generics.clone();
    if !input.generics.params.is_empty() {
        let where_clause = generics.make_where_clause();
        for f in &field_infos {
            match &f.factory {
                Some(factory) => {
                    let object_ty = &factory.object_ty;
                    where_clause
                        .predicates
                        .push(syn::parse_quote! { #object_ty: capmap::CaptureTarget + 'static });
                }
                None => {
                    let ty = &f.ty;
                    where_clause
                        .predicates
                        .push(syn::parse_quote! { #ty: capmap::target::FieldSlot });
                }
            }
        }
    }
    if !input.generics.params.is_empty() {
        // Pre-built values are taken out of `CaptureValue::Other` by type id
        let (_, ty_generics, _) = input.generics.split_for_impl();
        let where_clause = generics.make_where_clause();
        where_clause
            .predicates
            .push(syn::parse_quote! { #name #ty_generics: 'static });
        if !container.no_default {
            where_clause
                .predicates
                .push(syn::parse_quote! { #name #ty_generics: ::std::default::Default });
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let empty_body = if container.no_default {
        quote! { None }
    } else {
        quote! { Some(<Self as ::std::default::Default>::default()) }
    };

    Ok(quote! {
        impl #impl_generics capmap::CaptureTarget for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name_str
            }

            fn field_names(&self) -> &'static [&'static str] {
                &[#(#field_name_strs),*]
            }

            fn descend(
                &mut self,
                field: &str,
            ) -> Option<Result<&mut dyn capmap::CaptureTarget, capmap::ConstructError>> {
                match field {
                    #(#descend_arms)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn apply(
                &mut self,
                field: &str,
                cx: &capmap::ApplyContext<'_>,
            ) -> Option<Result<(), capmap::MapError>> {
                match field {
                    #(#apply_arms)*
                    _ => None,
                }
            }
        }

        impl #impl_generics capmap::target::FieldSlot for #name #ty_generics #where_clause {
            fn nests() -> bool {
                true
            }

            fn empty() -> Option<Self> {
                #empty_body
            }

            fn descend(
                &mut self,
            ) -> Option<Result<&mut dyn capmap::CaptureTarget, capmap::ConstructError>> {
                Some(Ok(self as &mut dyn capmap::CaptureTarget))
            }

            fn build(
                value: capmap::CaptureValue,
                _converters: &capmap::Converters,
            ) -> Result<Self, capmap::ConvertError> {
                value.downcast::<Self>().map_err(|value| {
                    capmap::ConvertError::unsupported(value.type_name(), #type_name_str)
                })
            }

            fn assign(
                &mut self,
                value: capmap::CaptureValue,
                converters: &capmap::Converters,
            ) -> Result<(), capmap::ConvertError> {
                *self = <Self as capmap::target::FieldSlot>::build(value, converters)?;
                Ok(())
            }
        }
    })
}

// ==================== Enums ====================

/// Generate `FromCapture` and a scalar `FieldSlot` for a C-like enum.
///
/// Names are tried exactly, then ASCII case-insensitively, then as the
/// variant's discriminant. `Nil` becomes the variant with discriminant 0.
fn derive_enum(input: &DeriveInput, data: &syn::DataEnum) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let type_name_str = name.to_string();
    let rename_all = parse_capture_attrs(&input.attrs)?.rename_all.map(|lit| lit.value());

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Captures cannot be derived for generic enums",
        ));
    }

    let mut idents = Vec::new();
    let mut names = Vec::new();
    let mut discriminants = Vec::new();
    let mut next_discriminant: i64 = 0;

    for variant in &data.variants {
        if !variant.fields.is_empty() {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "Captures enum support is limited to C-like enums (no fields on variants)",
            ));
        }
        let disc_value = match &variant.discriminant {
            Some((_, expr)) => parse_discriminant_expr(expr)?,
            None => next_discriminant,
        };
        next_discriminant = disc_value + 1;

        let attrs = parse_capture_attrs(&variant.attrs)?;
        if attrs.skip {
            continue;
        }

        idents.push(variant.ident.clone());
        names.push(display_name(
            attrs.name,
            &variant.ident.to_string(),
            rename_all.as_deref(),
        ));
        discriminants.push(disc_value);
    }

    let nil_arm = match discriminants.iter().position(|d| *d == 0) {
        Some(i) => {
            let ident = &idents[i];
            quote! { capmap::CaptureValue::Nil => Ok(#name::#ident), }
        }
        None => quote! {
            capmap::CaptureValue::Nil => {
                Err(capmap::ConvertError::unsupported("nil", #type_name_str))
            }
        },
    };

    Ok(quote! {
        impl capmap::FromCapture for #name {
            fn from_capture(value: capmap::CaptureValue) -> Result<Self, capmap::ConvertError> {
                fn by_discriminant(d: i64) -> Option<#name> {
                    match d {
                        #(#discriminants => Some(#name::#idents),)*
                        _ => None,
                    }
                }

                match value {
                    #nil_arm
                    capmap::CaptureValue::Str(s) => {
                        let t = s.trim();
                        #(
                            if t == #names {
                                return Ok(#name::#idents);
                            }
                        )*
                        #(
                            if t.eq_ignore_ascii_case(#names) {
                                return Ok(#name::#idents);
                            }
                        )*
                        t.parse::<i64>()
                            .ok()
                            .and_then(by_discriminant)
                            .ok_or_else(|| capmap::ConvertError::invalid(&s, #type_name_str))
                    }
                    capmap::CaptureValue::Integer(d) => by_discriminant(d)
                        .ok_or_else(|| capmap::ConvertError::out_of_range(d, #type_name_str)),
                    other => Err(capmap::ConvertError::unsupported(
                        other.type_name(),
                        #type_name_str,
                    )),
                }
            }
        }

        capmap::scalar_slot!(#name);
    })
}

/// Parse an enum discriminant expression to i64.
fn parse_discriminant_expr(expr: &syn::Expr) -> Result<i64, syn::Error> {
    match expr {
        syn::Expr::Lit(lit) => {
            if let syn::Lit::Int(int_lit) = &lit.lit {
                int_lit.base10_parse::<i64>().map_err(|_| {
                    syn::Error::new_spanned(int_lit, "enum discriminant must be a valid i64")
                })
            } else {
                Err(syn::Error::new_spanned(
                    expr,
                    "enum discriminant must be an integer literal",
                ))
            }
        }
        syn::Expr::Unary(unary) => {
            if let syn::UnOp::Neg(_) = unary.op {
                let val = parse_discriminant_expr(&unary.expr)?;
                Ok(-val)
            } else {
                Err(syn::Error::new_spanned(
                    expr,
                    "enum discriminant must be an integer literal",
                ))
            }
        }
        _ => Err(syn::Error::new_spanned(
            expr,
            "enum discriminant must be an integer literal",
        )),
    }
}
