extern crate proc_macro;
use proc_macro::TokenStream;
use syn::parse_macro_input;

pub(crate) mod crate_path;
pub(crate) mod model_codegen;
pub(crate) mod model_parsing;

/// Derive macro declaring a schema-bearing type.
///
/// # Item attribute
///
/// `#[model(...)]`:
///
/// | Parameter     | Description |
/// |---------------|-------------|
/// | `name = "..."`| Definition name; defaults to the type's name |
/// | `json_schema` | The type reports its own schema through `schemars::JsonSchema` |
///
/// The doc comment is kept verbatim. Text after a `---` line is read as a
/// YAML block declaring `description`, `required` and `properties`.
///
/// # Field attributes
///
/// `#[field(...)]`:
///
/// | Parameter              | Description |
/// |------------------------|-------------|
/// | `name = "..."`         | Property name; defaults to the field name |
/// | `description = "..."`  | Property description; defaults to the field's doc comment |
/// | `required`, `required = bool` | Defaults to "not an `Option`" |
/// | `example = <expr>`     | Any expression accepted by `serde_json::json!` |
/// | `choices(a, b, ...)`   | Allowed values, rendered as `enum` |
/// | `skip`                 | Leave the field out of the documentation |
///
/// Fields whose name starts with `_` are never documented.
///
/// # Enums
///
/// An enum whose variants each wrap one type is documented as a union of
/// those types. Other enums need `#[model(json_schema)]`.
///
/// # Example
///
/// ```ignore
/// /// A pet in the store.
/// ///
/// /// ---
/// /// required:
/// ///   - name
/// /// properties:
/// ///   name:
/// ///     type: string
/// ///   owner:
/// ///     ref: Owner
/// #[derive(ApiModel)]
/// pub struct Pet {
///     pub name: String,
///     pub owner: Owner,
/// }
///
/// #[derive(ApiModel)]
/// pub struct Owner {
///     /// Full name.
///     pub name: String,
///     #[field(choices("active", "retired"), example = "active")]
///     pub status: String,
///     #[field(skip)]
///     pub password_hash: String,
/// }
///
/// #[derive(ApiModel)]
/// pub enum Animal {
///     Cat(Cat),
///     Dog(Dog),
/// }
/// ```
#[proc_macro_derive(ApiModel, attributes(model, field))]
pub fn derive_api_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    match model_parsing::parse(input) {
        Ok(def) => model_codegen::generate(&def).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
