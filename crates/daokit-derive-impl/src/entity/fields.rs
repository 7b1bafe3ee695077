// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `impl Entity` generation.
//!
//! # Generated Code
//!
//! ```rust,ignore
//! impl ::daokit::Entity for User {
//!     fn table() -> &'static str {
//!         "users"
//!     }
//!
//!     fn fields() -> ::std::vec::Vec<::daokit::FieldDef<Self>> {
//!         ::std::vec![
//!             ::daokit::FieldDef::<Self>::storable::<i64>(
//!                 "id",
//!                 |entity| &entity.id,
//!                 |entity| &mut entity.id
//!             )
//!             .tag("auto"),
//!             // ...
//!         ]
//!     }
//! }
//! ```

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::{EntityDef, FieldDef, FieldShape};

/// Generate the `Entity` implementation.
pub fn generate(entity: &EntityDef) -> TokenStream {
    let ident = &entity.ident;
    let table = &entity.table;
    let (impl_generics, ty_generics, where_clause) = entity.generics.split_for_impl();
    let defs = entity.fields.iter().map(field_def);

    quote! {
        impl #impl_generics ::daokit::Entity for #ident #ty_generics #where_clause {
            fn table() -> &'static str {
                #table
            }

            fn fields() -> ::std::vec::Vec<::daokit::FieldDef<Self>> {
                ::std::vec![#(#defs),*]
            }
        }
    }
}

/// One accessor table entry.
fn field_def(field: &FieldDef) -> TokenStream {
    let ident = &field.ident;
    let name = field.name();

    let base = match (field.shape(), field.option_inner()) {
        (FieldShape::Storable, Some(inner)) => quote! {
            ::daokit::FieldDef::<Self>::storable::<#inner>(
                #name,
                |entity| &entity.#ident,
                |entity| &mut entity.#ident
            )
        },
        (FieldShape::Converted, Some(inner)) => quote! {
            ::daokit::FieldDef::<Self>::converted::<#inner>(
                #name,
                |entity| &entity.#ident,
                |entity| &mut entity.#ident
            )
        },
        (FieldShape::Embedded, _) => {
            let type_name = field.type_name();
            quote! { ::daokit::FieldDef::<Self>::embedded(#name, #type_name) }
        }
        _ => {
            let type_name = field.type_name();
            quote! { ::daokit::FieldDef::<Self>::unsupported(#name, #type_name) }
        }
    };

    let tag = field.tag.as_ref().map(|tag| quote! { .tag(#tag) });
    let unexported = (!field.exported).then(|| quote! { .unexported() });

    quote! { #base #tag #unexported }
}
