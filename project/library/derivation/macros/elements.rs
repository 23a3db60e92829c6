use crate::utility::{TokenStream1, TokenStream2, ensure_variant_is_fieldless};
use quote::quote;
use syn::Error;

pub(crate) fn derive(input: TokenStream1) -> Result<TokenStream2, Error> {
    let input: syn::ItemEnum = syn::parse(input)?;
    let type_ = input.ident;
    let count = input.variants.len();

    let mut variants = Vec::with_capacity(count);

    for variant in &input.variants {
        ensure_variant_is_fieldless(&variant.fields, "Elements")?;

        let name = &variant.ident;
        variants.push(quote! { Self::#name });
    }

    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::derivation::Elements for #type_ #type_generics #where_clause {
            type Iter = ::core::array::IntoIter<Self, #count>;

            fn elements() -> Self::Iter {
                [#( #variants ),*].into_iter()
            }
        }
    })
}
