//! Where generated code finds the runtime items.
//!
//! A model may be derived in a crate that depends on the `swaggen` facade or
//! on `swaggen-core` alone; the facade re-exports everything the generated
//! impls name.

use proc_macro2::{Span, TokenStream};
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;

/// Crates that expose the model traits, facade first.
const PROVIDERS: [&str; 2] = ["swaggen", "swaggen-core"];

/// Path prefix for `ApiModel`, `Attribute` and friends in generated code.
///
/// Resolves through the caller's manifest, honouring renamed dependencies.
/// Without either crate in the manifest, `::swaggen_core` is emitted so
/// the compiler reports the missing dependency at the use site.
pub fn swaggen_core_path() -> TokenStream {
    PROVIDERS
        .iter()
        .find_map(|provider| crate_name(provider).ok())
        .map_or_else(
            || quote!(::swaggen_core),
            |found| match found {
                FoundCrate::Itself => quote!(crate),
                FoundCrate::Name(name) => {
                    let ident = syn::Ident::new(&name, Span::call_site());
                    quote!(::#ident)
                }
            },
        )
}
