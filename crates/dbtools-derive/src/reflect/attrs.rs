//! Attribute parsing for the Reflect derive macro.
//!
//! Handles struct-level and field-level `#[dbtools(...)]` attributes.

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro2::Span;
use syn::{Result, spanned::Spanned};

use crate::sql_ident::parse_sql_ident;

/// Column naming applied to fields without an explicit `column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RenameRule {
    SnakeCase,
    LowerCamelCase,
    PascalCase,
    ScreamingSnakeCase,
    Lowercase,
    Uppercase,
}

impl RenameRule {
    fn parse(lit: &syn::LitStr) -> Result<Self> {
        Ok(match lit.value().as_str() {
            "snake_case" => Self::SnakeCase,
            "camelCase" => Self::LowerCamelCase,
            "PascalCase" => Self::PascalCase,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnakeCase,
            "lowercase" => Self::Lowercase,
            "UPPERCASE" => Self::Uppercase,
            other => {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("unsupported rename_all rule '{other}'"),
                ));
            }
        })
    }

    pub(super) fn apply(self, name: &str) -> String {
        match self {
            Self::SnakeCase => name.to_snake_case(),
            Self::LowerCamelCase => name.to_lower_camel_case(),
            Self::PascalCase => name.to_upper_camel_case(),
            Self::ScreamingSnakeCase => name.to_shouty_snake_case(),
            Self::Lowercase => name.to_lowercase(),
            Self::Uppercase => name.to_uppercase(),
        }
    }
}

#[derive(Default)]
pub(super) struct StructAttrs {
    pub(super) table: Option<String>,
    pub(super) rename_all: Option<RenameRule>,
}

#[derive(Default)]
pub(super) struct FieldAttrs {
    pub(super) is_id: bool,
    pub(super) column: Option<String>,
    pub(super) skip: bool,
    pub(super) json: bool,
}

struct StructAttrList(StructAttrs);

impl syn::parse::Parse for StructAttrList {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = StructAttrs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            let _: syn::Token![=] = input.parse()?;
            let value: syn::LitStr = input.parse()?;

            match ident.to_string().as_str() {
                "table" => attrs.table = Some(parse_sql_ident(&value, "table")?),
                "rename_all" => attrs.rename_all = Some(RenameRule::parse(&value)?),
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown dbtools attribute '{other}'"),
                    ));
                }
            }

            if input.is_empty() {
                break;
            }
            let _: syn::Token![,] = input.parse()?;
        }

        Ok(Self(attrs))
    }
}

struct FieldAttrList(FieldAttrs);

impl syn::parse::Parse for FieldAttrList {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = FieldAttrs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "id" => attrs.is_id = true,
                "skip" => attrs.skip = true,
                "json" => attrs.json = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attrs.column = Some(parse_sql_ident(&value, "column")?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown dbtools field attribute '{other}'"),
                    ));
                }
            }

            if input.is_empty() {
                break;
            }
            let _: syn::Token![,] = input.parse()?;
        }

        Ok(Self(attrs))
    }
}

/// Merge every `#[dbtools(...)]` attribute on the struct.
pub(super) fn parse_struct_attrs(attrs: &[syn::Attribute]) -> Result<StructAttrs> {
    let mut out = StructAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("dbtools")) {
        let StructAttrList(parsed) = attr.parse_args()?;
        if parsed.table.is_some() {
            out.table = parsed.table;
        }
        if parsed.rename_all.is_some() {
            out.rename_all = parsed.rename_all;
        }
    }
    Ok(out)
}

/// Merge every `#[dbtools(...)]` attribute on a field.
pub(super) fn parse_field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("dbtools")) {
        let FieldAttrList(parsed) = attr.parse_args()?;
        out.is_id |= parsed.is_id;
        out.skip |= parsed.skip;
        out.json |= parsed.json;
        if parsed.column.is_some() {
            out.column = parsed.column;
        }
    }

    if out.skip && (out.is_id || out.json || out.column.is_some()) {
        return Err(syn::Error::new(
            field.span(),
            "`skip` cannot be combined with other dbtools field attributes",
        ));
    }
    Ok(out)
}

/// Error for a second `#[dbtools(id)]` field.
pub(super) fn duplicate_id(span: Span) -> syn::Error {
    syn::Error::new(span, "only one field can be marked #[dbtools(id)]")
}
