// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::shared::{get_crate, get_fields, Context};
use proc_macro2::TokenStream;
use proc_quote::quote;
use syn::{DeriveInput, Index};

pub fn expand_tag_derive(input: DeriveInput) -> syn::Result<TokenStream> {
    let ctx = Context { is_encode: false };
    let taglink = get_crate()?;
    let items = get_fields(input.data, &ctx)?;

    let sets = items
        .iter()
        .map(|(field_name, ty, attr)| {
            let at = match attr.offset {
                Some(v) => {
                    let index = Index::from(v as usize);
                    quote! { offset + #index }
                }
                None => quote! { offset },
            };
            let ts = match attr.decode_fn {
                Some(ref f) => quote! {
                    res.#field_name = #f(tag, #at)?;
                },
                None => quote! {
                    <#ty as #taglink::Decode>::decode_in_place(tag, #at, &mut res.#field_name)?;
                },
            };
            Ok(ts)
        })
        .collect::<syn::Result<TokenStream>>()?;

    let st_name = input.ident;

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl  #impl_generics #taglink::Decode for #st_name #ty_generics #where_clause
         {
            fn decode(tag: &#taglink::RawTag, offset: u32) -> #taglink::Result<Self>{
                let mut res = <Self as Default>::default();
                #sets
                Ok(res)
            }
        }
    })
}
