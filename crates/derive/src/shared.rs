// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use proc_macro2::Span;
use proc_macro_crate::{crate_name, FoundCrate};
use syn::{
    spanned::Spanned, Attribute, Data, DataStruct, ExprPath, Fields, Ident, Lit, Meta, NestedMeta,
    Type,
};

pub struct Context {
    pub is_encode: bool,
}

pub fn get_crate() -> syn::Result<Ident> {
    let taglink = resolve("taglink")
        .or_else(|| resolve("taglink-core"))
        .unwrap_or_else(|| Ident::new("crate", Span::call_site()));
    Ok(taglink)
}

/// `Itself` shows up in the package's own tests and demos, where the lib goes by its name
fn resolve(package: &str) -> Option<Ident> {
    let name = match crate_name(package).ok()? {
        FoundCrate::Itself => package.replace('-', "_"),
        FoundCrate::Name(name) => name,
    };
    Some(Ident::new(&name, Span::call_site()))
}

/// fields carrying a `tag()` attribute, in declaration order
pub fn get_fields(data: Data, ctx: &Context) -> syn::Result<Vec<(Ident, Type, TagInfo)>> {
    let fields = match data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => fields.named,
        Data::Struct(DataStruct { fields, .. }) => {
            return Err(syn::Error::new(
                fields.span(),
                "this derive macro only works on structs with named fields",
            ))
        }
        Data::Enum(e) => {
            return Err(syn::Error::new(
                e.enum_token.span,
                "this derive macro only works on structs with named fields",
            ))
        }
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span,
                "this derive macro only works on structs with named fields",
            ))
        }
    };
    let span = fields.span();
    let mut items = vec![];
    for f in fields {
        let attrs: Vec<_> = f
            .attrs
            .iter()
            .filter(|attr| attr.path.is_ident("tag"))
            .collect();
        let info = match attrs.len() {
            0 => continue,
            1 => get_tag_attr(attrs[0], ctx)?,
            _ => {
                let mut error = syn::Error::new_spanned(attrs[1], "redundant `tag()` attribute");
                error.combine(syn::Error::new_spanned(attrs[0], "note: first one here"));
                return Err(error);
            }
        };
        let field_name = match f.ident {
            Some(ident) => ident,
            None => return Err(syn::Error::new_spanned(&f.ty, "expected a named field")),
        };
        items.push((field_name, f.ty, info));
    }

    if items.is_empty() {
        return Err(syn::Error::new(
            span,
            "this derive macro requires at least one tag() attribute on structs",
        ));
    }
    Ok(items)
}

fn get_tag_attr(attr: &Attribute, ctx: &Context) -> syn::Result<TagInfo> {
    let meta = attr.parse_meta()?;
    //tag()
    let meta_list = match meta {
        Meta::List(list) => list,
        _ => {
            return Err(syn::Error::new_spanned(
                meta,
                "bad usage, expected `tag(offset = N)`",
            ))
        }
    };

    let mut info = TagInfo::default();
    for item in meta_list.nested.iter() {
        let name_value = match item {
            NestedMeta::Meta(Meta::NameValue(nv)) => nv,
            _ => {
                return Err(syn::Error::new_spanned(
                    item,
                    "expected `offset = N`, `decode_fn = \"path\"` or `encode_fn = \"path\"`",
                ))
            }
        };

        if name_value.path.is_ident("offset") {
            match &name_value.lit {
                Lit::Int(s) => {
                    if info.offset.is_some() {
                        return Err(syn::Error::new_spanned(
                            s,
                            "redundant definition for offset",
                        ));
                    }
                    info.offset = Some(s.base10_parse()?);
                }
                lit => return Err(syn::Error::new_spanned(lit, "expected int literal")),
            }
        } else if name_value.path.is_ident("decode_fn") {
            if info.decode_fn.is_some() {
                return Err(syn::Error::new_spanned(
                    name_value,
                    "redundant definition for decode_fn",
                ));
            }
            info.decode_fn = Some(get_fn_path(&name_value.lit)?);
        } else if name_value.path.is_ident("encode_fn") {
            if info.encode_fn.is_some() {
                return Err(syn::Error::new_spanned(
                    name_value,
                    "redundant definition for encode_fn",
                ));
            }
            info.encode_fn = Some(get_fn_path(&name_value.lit)?);
        } else {
            return Err(syn::Error::new_spanned(
                &name_value.path,
                "unsupported tag attribute, expected `offset`, `decode_fn` or `encode_fn`",
            ));
        }
    }

    let custom = if ctx.is_encode {
        info.encode_fn.is_some()
    } else {
        info.decode_fn.is_some()
    };
    if info.offset.is_none() && !custom {
        return Err(syn::Error::new_spanned(
            &meta_list.path,
            "tag attribute `offset` is required",
        ));
    }
    Ok(info)
}

fn get_fn_path(lit: &Lit) -> syn::Result<ExprPath> {
    match lit {
        Lit::Str(s) => s.parse(),
        lit => Err(syn::Error::new_spanned(lit, "expected a function path string")),
    }
}

#[derive(Default)]
pub struct TagInfo {
    pub offset: Option<u32>,
    pub decode_fn: Option<ExprPath>,
    pub encode_fn: Option<ExprPath>,
}
