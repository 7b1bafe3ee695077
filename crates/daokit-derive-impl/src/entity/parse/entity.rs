// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity-level attribute parsing.

use darling::FromDeriveInput;
use syn::{DeriveInput, Generics, Ident};

use super::field::FieldDef;

/// Entity-level attributes parsed from `#[dao(...)]`.
///
/// Field-level `#[dao(...)]` attributes share the name and are handled by
/// [`FieldDef`], so darling only looks at the struct attributes here.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(dao), supports(struct_named))]
struct EntityAttrs {
    ident:    Ident,
    generics: Generics,

    /// Database table name. Required.
    table: String
}

/// Complete parsed entity definition.
#[derive(Debug)]
pub struct EntityDef {
    /// Struct identifier.
    pub ident: Ident,

    /// Struct generics, carried into the generated impl.
    pub generics: Generics,

    /// Database table name.
    pub table: String,

    /// Fields in declaration order.
    pub fields: Vec<FieldDef>
}

impl EntityDef {
    /// Parse entity definition from syn's `DeriveInput`.
    ///
    /// # Errors
    ///
    /// - Missing `table` attribute
    /// - Applied to anything but a struct with named fields
    /// - Malformed field attributes
    pub fn from_derive_input(input: &DeriveInput) -> darling::Result<Self> {
        let attrs = EntityAttrs::from_derive_input(input)?;

        let fields = match &input.data {
            syn::Data::Struct(data) => match &data.fields {
                syn::Fields::Named(named) => named
                    .named
                    .iter()
                    .map(FieldDef::from_field)
                    .collect::<darling::Result<Vec<_>>>()?,
                _ => {
                    return Err(darling::Error::custom("Entity requires named fields")
                        .with_span(&input.ident));
                }
            },
            _ => {
                return Err(
                    darling::Error::custom("Entity can only be derived for structs")
                        .with_span(&input.ident)
                );
            }
        };

        Ok(Self {
            ident: attrs.ident,
            generics: attrs.generics,
            table: attrs.table,
            fields
        })
    }
}

#[cfg(test)]
mod tests {
    use syn::DeriveInput;

    use super::*;

    #[test]
    fn parses_table_and_fields() {
        let input: DeriveInput = syn::parse_quote! {
            #[dao(table = "users")]
            pub struct User {
                #[dao(tag = "auto")]
                pub id: Option<i64>,
                pub name: Option<String>,
            }
        };
        let entity = EntityDef::from_derive_input(&input).unwrap();
        assert_eq!(entity.ident, "User");
        assert_eq!(entity.table, "users");
        assert_eq!(entity.fields.len(), 2);
        assert_eq!(entity.fields[0].tag.as_deref(), Some("auto"));
    }

    #[test]
    fn missing_table_is_an_error() {
        let input: DeriveInput = syn::parse_quote! {
            pub struct User {
                pub id: Option<i64>,
            }
        };
        assert!(EntityDef::from_derive_input(&input).is_err());
    }

    #[test]
    fn enums_are_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            #[dao(table = "states")]
            pub enum State { On, Off }
        };
        assert!(EntityDef::from_derive_input(&input).is_err());
    }

    #[test]
    fn tuple_structs_are_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            #[dao(table = "pairs")]
            pub struct Pair(Option<i64>, Option<i64>);
        };
        assert!(EntityDef::from_derive_input(&input).is_err());
    }

    #[test]
    fn generics_are_kept() {
        let input: DeriveInput = syn::parse_quote! {
            #[dao(table = "boxes")]
            pub struct Boxed<T: Send> {
                pub id: Option<i64>,
                pub extra: Option<T>,
            }
        };
        let entity = EntityDef::from_derive_input(&input).unwrap();
        assert_eq!(entity.generics.params.len(), 1);
    }
}
