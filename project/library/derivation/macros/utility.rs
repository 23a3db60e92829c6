pub(crate) use proc_macro::TokenStream as TokenStream1;
pub(crate) use proc_macro2::TokenStream as TokenStream2;
use quote::ToTokens;
use syn::{
    AttrStyle, Attribute, Fields,
    parse::{Error, Parse},
};

pub(crate) trait HelperAttribute: Parse {
    const NAME: &'static str;

    fn obtain<Owner: ToTokens>(owner: &Owner, attrs: &[Attribute]) -> syn::Result<Self> {
        Self::obtain_optional(attrs)?.ok_or_else(|| {
            Error::new_spanned(
                owner,
                format!("missing helper attribute `#[{}]`", Self::NAME),
            )
        })
    }

    fn obtain_optional(attrs: &[Attribute]) -> syn::Result<Option<Self>> {
        let mut attrs = attrs
            .iter()
            .filter(|attr| attr.path().is_ident(Self::NAME) && matches!(attr.style, AttrStyle::Outer));

        let Some(attr) = attrs.next() else {
            return Ok(None);
        };

        if let Some(duplicate) = attrs.next() {
            return Err(Error::new_spanned(
                duplicate,
                format!("duplicate helper attribute `#[{}]`", Self::NAME),
            ));
        }

        attr.parse_args().map(Some)
    }
}

pub(crate) trait SerializeExt {
    fn serialize(self) -> TokenStream1;
}

impl SerializeExt for syn::Result<TokenStream2> {
    fn serialize(self) -> TokenStream1 {
        self.unwrap_or_else(Error::into_compile_error).into()
    }
}

pub(crate) fn ensure_variant_is_fieldless(fields: &Fields, macro_name: &str) -> syn::Result<()> {
    if let Fields::Named(_) | Fields::Unnamed(_) = fields {
        return Err(Error::new_spanned(
            fields,
            format!("variant may not have fields when deriving `derivation::{macro_name}`"),
        ));
    }

    Ok(())
}
