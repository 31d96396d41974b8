//! Reflect derive macro implementation

mod attrs;

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Result};

use crate::sql_ident::check_sql_ident;
use attrs::{duplicate_id, parse_field_attrs, parse_struct_attrs};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Reflect can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Reflect can only be derived for structs",
            ));
        }
    };

    let struct_attrs = parse_struct_attrs(&input.attrs)?;

    let mut descriptors = Vec::with_capacity(fields.len());
    let mut primary_key: Option<String> = None;

    for field in fields {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }

        let Some(field_ident) = field.ident.as_ref() else {
            return Err(syn::Error::new(field.span(), "expected a named field"));
        };
        let field_name = field_ident.unraw().to_string();

        let column = match attrs.column {
            Some(column) => column,
            None => {
                let column = match struct_attrs.rename_all {
                    Some(rule) => rule.apply(&field_name),
                    None => field_name,
                };
                check_sql_ident(&column, field_ident.span(), "column")?
            }
        };

        if attrs.is_id {
            if primary_key.is_some() {
                return Err(duplicate_id(field.span()));
            }
            primary_key = Some(column.clone());
        }

        let ty = &field.ty;
        let declared_type = quote!(#ty).to_string().replace(' ', "");

        let read = if attrs.json {
            quote! { dbtools::Value::json(&record.#field_ident) }
        } else {
            quote! { dbtools::ToValue::to_value(&record.#field_ident) }
        };

        descriptors.push(quote! {
            dbtools::FieldDescriptor::new(#column, #declared_type, |record: &Self| #read)
        });
    }

    let table_fn = match &struct_attrs.table {
        Some(table) => quote! {
            fn table() -> ::std::option::Option<&'static str> {
                ::std::option::Option::Some(#table)
            }
        },
        None => quote! {},
    };

    let primary_key_fn = match &primary_key {
        Some(pk) => quote! {
            fn primary_key() -> ::std::option::Option<&'static str> {
                ::std::option::Option::Some(#pk)
            }
        },
        None => quote! {},
    };

    Ok(quote! {
        impl #impl_generics dbtools::Reflect for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<dbtools::FieldDescriptor<Self>> {
                ::std::vec![#(#descriptors),*]
            }

            #table_fn

            #primary_key_fn
        }
    })
}
