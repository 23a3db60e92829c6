use proc_macro::TokenStream as TokenStream1;
use proc_macro2::Span;
use quote::quote;
use syn::{parse::Error, spanned::Spanned};

/// Derive `index_map::Index` for a newtype over an unsigned integer.
#[proc_macro_derive(Index)]
pub fn derive_index(input: TokenStream1) -> TokenStream1 {
    let input = syn::parse_macro_input!(input as syn::ItemStruct);

    if !input.generics.params.is_empty() {
        return report(input.generics.params.span(), "parameters not supported");
    }

    let ident = input.ident;
    let span = input.fields.span();

    let syn::Fields::Unnamed(fields) = input.fields else {
        return report(span, "index types must be tuple structs");
    };

    if fields.unnamed.len() != 1 {
        return report(span, "index types must have exactly one unnamed field");
    }

    let stream = quote! {
        impl ::index_map::Index for #ident {
            fn new(index: usize) -> Self {
                match index.try_into() {
                    Ok(index) => Self(index),
                    Err(_) => panic!("index {index} does not fit into {}", stringify!(#ident)),
                }
            }

            fn value(self) -> usize {
                self.0 as usize
            }
        }
    };

    stream.into()
}

fn report(span: Span, message: impl std::fmt::Display) -> TokenStream1 {
    Error::new(span, message).into_compile_error().into()
}
