//! Implementation of `#[derive(Specimen)]`

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::{
    Attribute, Data, DeriveInput, Error, Expr, ExprLit, Field, Fields, GenericParam, Lit, Meta,
    MetaNameValue, Result, Variant, parse_macro_input, parse_quote,
};

/// Main entry point for the Specimen derive macro
pub fn derive_specimen_impl(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_specimen_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_specimen_impl(input: &DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let mut generics = input.generics.clone();
    add_trait_bounds(&mut generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data_struct) => construct(quote! { #name }, &data_struct.fields)?,
        Data::Enum(data_enum) => {
            generate_enum_body(name, &data_enum.variants.iter().collect::<Vec<_>>())?
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                "Specimen derive is not supported for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::autodata::Specimen for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn create(
                ctx: &mut ::autodata::SpecimenContext<'_>,
            ) -> ::core::result::Result<Self, ::autodata::DataError> {
                ::core::result::Result::Ok(#body)
            }
        }
    })
}

fn add_trait_bounds(generics: &mut syn::Generics) {
    for param in &mut generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(::autodata::Specimen));
        }
    }
}

/// Expression constructing `path` with a specimen for every field
fn construct(path: TokenStream, fields: &Fields) -> Result<TokenStream> {
    match fields {
        Fields::Named(fields_named) => {
            let values = fields_named
                .named
                .iter()
                .map(|field| {
                    let field_name = field
                        .ident
                        .as_ref()
                        .ok_or_else(|| Error::new_spanned(field, "expected a named field"))?;
                    let value = field_value(field)?;
                    Ok(quote! { #field_name: #value })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(quote! { #path { #(#values,)* } })
        }
        Fields::Unnamed(fields_unnamed) => {
            let values = fields_unnamed
                .unnamed
                .iter()
                .map(field_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(quote! { #path( #(#values,)* ) })
        }
        Fields::Unit => Ok(path),
    }
}

fn generate_enum_body(name: &syn::Ident, variants: &[&Variant]) -> Result<TokenStream> {
    let Some((last, rest)) = variants.split_last() else {
        return Err(Error::new_spanned(
            name,
            "Cannot derive Specimen for empty enum",
        ));
    };

    let variant_count = variants.len();
    let arms = rest
        .iter()
        .enumerate()
        .map(|(index, variant)| {
            let variant_name = &variant.ident;
            let value = construct(quote! { #name::#variant_name }, &variant.fields)?;
            Ok(quote! { #index => #value })
        })
        .collect::<Result<Vec<_>>>()?;

    let last_name = &last.ident;
    let last_value = construct(quote! { #name::#last_name }, &last.fields)?;

    Ok(quote! {
        match ctx.choose_index(#variant_count) {
            #(#arms,)*
            _ => #last_value,
        }
    })
}

/// How a single field is created
#[derive(Debug, Clone, PartialEq)]
enum FieldSource {
    Fixture,
    Default,
    With(syn::Path),
}

fn field_value(field: &Field) -> Result<TokenStream> {
    let field_type = &field.ty;
    let value = match field_source(&field.attrs)? {
        FieldSource::Default => quote! { ::core::default::Default::default() },
        FieldSource::With(path) => quote! { #path(ctx)? },
        FieldSource::Fixture => match &field.ident {
            Some(field_name) => {
                let label = field_name.to_string();
                let label = label.strip_prefix("r#").unwrap_or(&label);
                quote! { ctx.create_named::<#field_type>(#label)? }
            }
            None => quote! { ctx.create::<#field_type>()? },
        },
    };
    Ok(value)
}

/// Parse `#[specimen(...)]` attributes of a field
fn field_source(attrs: &[Attribute]) -> Result<FieldSource> {
    let mut source = FieldSource::Fixture;

    for attr in attrs {
        if !attr.path().is_ident("specimen") {
            continue;
        }
        let Meta::List(list) = &attr.meta else {
            return Err(Error::new_spanned(
                attr,
                "Specimen attribute must be a list",
            ));
        };

        let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
        for meta in parser.parse2(list.tokens.clone())? {
            let parsed = match &meta {
                Meta::Path(path) if path.is_ident("default") => FieldSource::Default,
                Meta::NameValue(MetaNameValue { path, value, .. }) if path.is_ident("with") => {
                    FieldSource::With(parse_with_path(value)?)
                }
                _ => {
                    return Err(Error::new_spanned(
                        meta,
                        "Unsupported specimen attribute, expected `default` or `with = \"path\"`",
                    ));
                }
            };
            if source != FieldSource::Fixture {
                return Err(Error::new_spanned(
                    meta,
                    "Only one of `default` and `with` may be given",
                ));
            }
            source = parsed;
        }
    }

    Ok(source)
}

fn parse_with_path(value: &Expr) -> Result<syn::Path> {
    if let Expr::Lit(ExprLit {
        lit: Lit::Str(lit_str),
        ..
    }) = value
    {
        return lit_str.parse();
    }

    Err(Error::new_spanned(
        value,
        "With attribute must be a string literal naming a function",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: DeriveInput) -> String {
        generate_specimen_impl(&input).unwrap().to_string()
    }

    #[test]
    fn test_add_trait_bounds() {
        let mut generics: syn::Generics = parse_quote! { <T, U> };
        add_trait_bounds(&mut generics);

        if let GenericParam::Type(type_param) = &generics.params[1] {
            assert_eq!(type_param.bounds.len(), 1);
        }
    }

    #[test]
    fn test_unit_struct() {
        let name: TokenStream = quote! { Marker };
        let result = construct(name, &Fields::Unit).unwrap();
        assert_eq!(result.to_string(), quote! { Marker }.to_string());
    }

    #[test]
    fn test_named_fields_use_field_names() {
        let output = expand(parse_quote! {
            struct User {
                id: u32,
                r#type: String,
            }
        });
        assert!(output.contains("create_named :: < u32 > (\"id\")"));
        assert!(output.contains("create_named :: < String > (\"type\")"));
    }

    #[test]
    fn test_tuple_fields_are_anonymous() {
        let output = expand(parse_quote! {
            struct Pair(u8, bool);
        });
        assert!(output.contains("create :: < u8 > ()"));
        assert!(output.contains("create :: < bool > ()"));
    }

    #[test]
    fn test_field_attributes() {
        let field: Field = parse_quote! {
            #[specimen(with = "crate::make_code")]
            code: String
        };
        assert_eq!(
            field_source(&field.attrs).unwrap(),
            FieldSource::With(parse_quote!(crate::make_code))
        );

        let field: Field = parse_quote! {
            #[specimen(default)]
            notes: Vec<String>
        };
        assert_eq!(field_source(&field.attrs).unwrap(), FieldSource::Default);

        let field: Field = parse_quote! {
            #[specimen(default, with = "make")]
            both: u8
        };
        assert!(field_source(&field.attrs).is_err());

        let field: Field = parse_quote! {
            #[specimen(range = "1..3")]
            bounded: u8
        };
        assert!(field_source(&field.attrs).is_err());
    }

    #[test]
    fn test_enum_picks_variant_by_index() {
        let output = expand(parse_quote! {
            enum Shape {
                Point,
                Circle(f64),
                Rect { w: f64, h: f64 },
            }
        });
        assert!(output.contains("choose_index (3usize)"));
        assert!(output.contains("0usize => Shape :: Point"));
        assert!(output.contains("_ => Shape :: Rect"));
    }

    #[test]
    fn test_empty_enum_and_union_are_rejected() {
        let empty: DeriveInput = parse_quote! { enum Never {} };
        assert!(generate_specimen_impl(&empty).is_err());

        let union: DeriveInput = parse_quote! { union Bits { a: u32, b: f32 } };
        assert!(generate_specimen_impl(&union).is_err());
    }
}
