// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field-level attribute parsing.
//!
//! | Attribute | Effect |
//! |-----------|--------|
//! | `tag = "..."` | Raw tag handed to the registry |
//! | `convert` | Field goes through `Convert` |
//! | `embedded` | Field is flattened, never a column |

use syn::{Attribute, Field, GenericArgument, Ident, PathArguments, Type, Visibility};

/// How a field is laid out in the accessor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// `Option<T>`, stored directly.
    Storable,
    /// `Option<T>` with `#[dao(convert)]`.
    Converted,
    /// `#[dao(embedded)]`.
    Embedded,
    /// Any other type.
    Unsupported
}

/// Parsed field definition.
#[derive(Debug)]
pub struct FieldDef {
    /// Field identifier.
    pub ident: Ident,

    /// Field type as declared.
    pub ty: Type,

    /// Declared `pub`.
    pub exported: bool,

    /// Raw tag from `#[dao(tag = "...")]`.
    pub tag: Option<String>,

    /// `#[dao(convert)]` is present.
    pub convert: bool,

    /// `#[dao(embedded)]` is present.
    pub embedded: bool
}

impl FieldDef {
    /// Parse field definition from syn's `Field`.
    ///
    /// # Errors
    ///
    /// Returns an error for unnamed fields or malformed `#[dao(...)]`.
    pub fn from_field(field: &Field) -> darling::Result<Self> {
        let ident = field.ident.clone().ok_or_else(|| {
            darling::Error::custom("Entity fields must be named").with_span(field)
        })?;

        let mut def = Self {
            ident,
            ty: field.ty.clone(),
            exported: matches!(field.vis, Visibility::Public(_)),
            tag: None,
            convert: false,
            embedded: false
        };

        for attr in &field.attrs {
            if attr.path().is_ident("dao") {
                def.parse_dao_attr(attr)?;
            }
        }

        Ok(def)
    }

    fn parse_dao_attr(&mut self, attr: &Attribute) -> darling::Result<()> {
        let meta_list = attr.meta.require_list().map_err(darling::Error::from)?;

        meta_list
            .parse_nested_meta(|meta| {
                if meta.path.is_ident("tag") {
                    let _: syn::Token![=] = meta.input.parse()?;
                    let value: syn::LitStr = meta.input.parse()?;
                    self.tag = Some(value.value());
                } else if meta.path.is_ident("convert") {
                    self.convert = true;
                } else if meta.path.is_ident("embedded") {
                    self.embedded = true;
                } else {
                    return Err(meta.error("expected `tag`, `convert` or `embedded`"));
                }
                Ok(())
            })
            .map_err(darling::Error::from)
    }

    /// Field name as a string, without a raw-identifier prefix.
    #[must_use]
    pub fn name(&self) -> String {
        let name = self.ident.to_string();
        match name.strip_prefix("r#") {
            Some(stripped) => stripped.to_string(),
            None => name
        }
    }

    /// Field type rendered without whitespace.
    #[must_use]
    pub fn type_name(&self) -> String {
        let ty = &self.ty;
        quote::quote!(#ty).to_string().replace(' ', "")
    }

    /// Inner `T` of an `Option<T>` field type.
    #[must_use]
    pub fn option_inner(&self) -> Option<&Type> {
        let Type::Path(path) = &self.ty else {
            return None;
        };
        if path.qself.is_some() {
            return None;
        }
        let segment = path.path.segments.last()?;
        if segment.ident != "Option" {
            return None;
        }
        let PathArguments::AngleBracketed(args) = &segment.arguments else {
            return None;
        };
        if args.args.len() != 1 {
            return None;
        }
        match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None
        }
    }

    /// Accessor table layout for this field.
    #[must_use]
    pub fn shape(&self) -> FieldShape {
        if self.embedded {
            return FieldShape::Embedded;
        }
        match (self.option_inner(), self.convert) {
            (Some(_), true) => FieldShape::Converted,
            (Some(_), false) => FieldShape::Storable,
            (None, _) => FieldShape::Unsupported
        }
    }
}
