use crate::{
    format::FormatAttribute,
    utility::{HelperAttribute, TokenStream1, TokenStream2, ensure_variant_is_fieldless},
};
use quote::quote;
use syn::Error;

pub(crate) fn derive(input: TokenStream1) -> Result<TokenStream2, Error> {
    let input: syn::ItemEnum = syn::parse(input)?;
    let type_ = input.ident;
    let FormatAttribute { letter_case } = HelperAttribute::obtain(&type_, &input.attrs)?;

    let mut arms = Vec::with_capacity(input.variants.len());

    for variant in &input.variants {
        ensure_variant_is_fieldless(&variant.fields, "FromStr")?;

        let name = &variant.ident;
        let representation = letter_case.transform(name);

        arms.push(quote! { #representation => Self::#name });
    }

    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::core::str::FromStr for #type_ #type_generics #where_clause {
            type Err = ();

            fn from_str(source: &::core::primitive::str) -> ::core::result::Result<Self, Self::Err> {
                ::core::result::Result::Ok(match source {
                    #( #arms, )*
                    _ => return ::core::result::Result::Err(()),
                })
            }
        }
    })
}
