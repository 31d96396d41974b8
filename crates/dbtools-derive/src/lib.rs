//! Derive macros for dbtools
//!
//! Provides `#[derive(Reflect)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod reflect;
mod sql_ident;

/// Derive the `Reflect` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use dbtools::Reflect;
///
/// #[derive(Reflect)]
/// #[dbtools(table = "users", rename_all = "PascalCase")]
/// struct User {
///     #[dbtools(id)]
///     id: i64,
///     name: String,
///     #[dbtools(column = "EmailAddress")]
///     email: Option<String>,
///     #[dbtools(json)]
///     tags: Vec<String>,
///     #[dbtools(skip)]
///     cache: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// Container:
/// - `#[dbtools(table = "name")]` - Table name returned by `Reflect::table()`
/// - `#[dbtools(rename_all = "...")]` - Column naming: `snake_case`, `camelCase`, `PascalCase`,
///   `SCREAMING_SNAKE_CASE`, `lowercase`, `UPPERCASE`
///
/// Field:
/// - `#[dbtools(id)]` - Primary key column returned by `Reflect::primary_key()`
/// - `#[dbtools(column = "name")]` - Map field to a different column name
/// - `#[dbtools(skip)]` - Leave the field out of reflection
/// - `#[dbtools(json)]` - Store the field as JSON (the type must implement `serde::Serialize`)
///
/// Every other field type must implement `dbtools::ToValue`.
#[proc_macro_derive(Reflect, attributes(dbtools))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    reflect::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
