use proc_macro2::TokenStream;
use quote::quote;

use crate::crate_path::swaggen_core_path;
use crate::model_parsing::{FieldDef, ModelBody, ModelDef};

pub fn generate(def: &ModelDef) -> TokenStream {
    match &def.body {
        ModelBody::Union(alternatives) if !def.json_schema => generate_union(def, alternatives),
        _ => {
            let api_model = generate_api_model(def);
            let describe = generate_model_describe(def);
            quote! {
                #api_model
                #describe
            }
        }
    }
}

/// `impl ApiModel`: name, doc text, attributes and the optional
/// self-describing hook.
fn generate_api_model(def: &ModelDef) -> TokenStream {
    let krate = swaggen_core_path();
    let ident = &def.ident;
    let name = &def.name;

    let doc = match &def.doc {
        Some(doc) => quote! { ::core::option::Option::Some(#doc) },
        None => quote! { ::core::option::Option::None },
    };

    let attributes: Vec<TokenStream> = match &def.body {
        ModelBody::Struct(fields) => fields.iter().map(generate_attribute).collect(),
        _ => Vec::new(),
    };

    let self_schema = if def.json_schema {
        quote! {
            fn self_schema() -> ::core::option::Option<#krate::serde_json::Value> {
                #krate::json_schema_of::<Self>()
            }
        }
    } else {
        quote! {}
    };

    quote! {
        impl #krate::ApiModel for #ident {
            fn model_name() -> &'static str {
                #name
            }

            fn model_doc() -> ::core::option::Option<&'static str> {
                #doc
            }

            fn attributes() -> ::std::vec::Vec<#krate::Attribute> {
                ::std::vec![#(#attributes),*]
            }

            #self_schema
        }
    }
}

fn generate_attribute(field: &FieldDef) -> TokenStream {
    let krate = swaggen_core_path();
    let name = &field.name;
    let ty = &field.ty;
    let required = field.required;

    let description = match &field.description {
        Some(text) if !text.is_empty() => {
            quote! { ::core::option::Option::Some(::std::string::String::from(#text)) }
        }
        _ => quote! { ::core::option::Option::None },
    };
    let example = match &field.example {
        Some(expr) => quote! { ::core::option::Option::Some(#krate::serde_json::json!(#expr)) },
        None => quote! { ::core::option::Option::None },
    };
    let choices = match &field.choices {
        Some(values) => quote! {
            ::core::option::Option::Some(::std::vec![#(#krate::serde_json::json!(#values)),*])
        },
        None => quote! { ::core::option::Option::None },
    };

    quote! {
        #krate::Attribute::new(#name, <#ty as #krate::Describe>::shape())
            .required(#required)
            .with_meta(#krate::FieldMeta {
                description: #description,
                example: #example,
                choices: #choices,
                ..::core::default::Default::default()
            })
    }
}

/// `impl Describe` pointing at the model's own definition.
fn generate_model_describe(def: &ModelDef) -> TokenStream {
    let krate = swaggen_core_path();
    let ident = &def.ident;
    quote! {
        impl #krate::Describe for #ident {
            fn shape() -> #krate::TypeShape {
                #krate::TypeShape::Model(#krate::ModelType::of::<Self>())
            }
        }
    }
}

/// `impl Describe` for a newtype-variant enum: a union of the wrapped types.
fn generate_union(def: &ModelDef, alternatives: &[syn::Type]) -> TokenStream {
    let krate = swaggen_core_path();
    let ident = &def.ident;
    quote! {
        impl #krate::Describe for #ident {
            fn shape() -> #krate::TypeShape {
                #krate::TypeShape::Union(::std::vec![
                    #(<#alternatives as #krate::Describe>::shape()),*
                ])
            }
        }
    }
}
