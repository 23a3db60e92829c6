use utility::{SerializeExt, TokenStream1};

mod elements;
mod format;
mod from_str;
mod str;
mod utility;

/// Derive an implementation of `derivation::Elements` listing every variant in declaration order.
///
/// Only fieldless enums are supported.
#[proc_macro_derive(Elements)]
pub fn derive_elements(input: TokenStream1) -> TokenStream1 {
    elements::derive(input).serialize()
}

/// Derive a [`FromStr`][trait] implementation for a fieldless enum.
///
/// The letter case of the textual representation is specified with `#[format(CASE)]`
/// where `CASE` is `dash_case` or `snake_case`.
///
/// # Examples
///
/// ```ignore
/// #[derive(FromStr)]
/// #[format(dash_case)]
/// pub enum Mode {
///     Default,
///     IncreasedPriority,
/// }
/// ```
///
/// accepts `"default"` and `"increased-priority"`.
///
/// [trait]: std::str::FromStr
#[proc_macro_derive(FromStr, attributes(format))]
pub fn derive_from_str(input: TokenStream1) -> TokenStream1 {
    from_str::derive(input).serialize()
}

/// Derive a `const fn` mapping each variant to its name.
///
/// The method is called `name` unless overridden with `#[str(METHOD)]`.
/// Variants may carry fields, they are ignored.
///
/// # Examples
///
/// ```ignore
/// #[derive(Str)]
/// #[format(dash_case)]
/// pub enum Severity {
///     Warning,
///     Error,
/// }
///
/// assert_eq!(Severity::Warning.name(), "warning");
/// ```
#[proc_macro_derive(Str, attributes(format, str))]
pub fn derive_str(input: TokenStream1) -> TokenStream1 {
    str::derive(input).serialize()
}
