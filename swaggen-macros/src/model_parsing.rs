use syn::parse::Parse;

/// Parsed representation of a `#[derive(ApiModel)]` item.
pub struct ModelDef {
    pub ident: syn::Ident,
    /// Display name, from `#[model(name = "...")]` or the type's ident.
    pub name: String,
    pub doc: Option<String>,
    /// `#[model(json_schema)]`: the type reports its own schema via schemars.
    pub json_schema: bool,
    pub body: ModelBody,
}

pub enum ModelBody {
    /// A struct with named fields (or a unit struct, with none).
    Struct(Vec<FieldDef>),
    /// An enum whose variants each wrap one type, documented as a union.
    Union(Vec<syn::Type>),
    /// Any other enum; only allowed together with `json_schema`.
    Opaque,
}

/// A declared attribute of a struct model.
pub struct FieldDef {
    /// Property name, after `#[field(name = "...")]`.
    pub name: String,
    pub ty: syn::Type,
    pub required: bool,
    pub description: Option<String>,
    pub example: Option<syn::Expr>,
    pub choices: Option<Vec<syn::Expr>>,
}

pub fn parse(input: syn::DeriveInput) -> syn::Result<ModelDef> {
    let ident = input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(ApiModel)] does not support generic types: a definition needs one fixed name",
        ));
    }

    let mut name = None;
    let mut json_schema = false;
    for attr in &input.attrs {
        if attr.path().is_ident("model") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    name = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("json_schema") {
                    json_schema = true;
                    Ok(())
                } else {
                    Err(meta.error(
                        "unknown attribute in #[model(...)]: expected `name` or `json_schema`",
                    ))
                }
            })?;
        }
    }

    let body = match input.data {
        syn::Data::Struct(data) => match data.fields {
            syn::Fields::Named(named) => {
                let fields = named
                    .named
                    .into_iter()
                    .map(parse_field)
                    .collect::<syn::Result<Vec<_>>>()?;
                ModelBody::Struct(fields.into_iter().flatten().collect())
            }
            syn::Fields::Unit => ModelBody::Struct(Vec::new()),
            syn::Fields::Unnamed(_) => {
                return Err(syn::Error::new(
                    ident.span(),
                    "#[derive(ApiModel)] needs named fields:\n\
                     \n  struct Pet {\n      name: String,\n  }",
                ))
            }
        },
        syn::Data::Enum(data) => parse_enum(&ident, data, json_schema)?,
        syn::Data::Union(_) => {
            return Err(syn::Error::new(
                ident.span(),
                "#[derive(ApiModel)] only works on structs and enums",
            ))
        }
    };

    Ok(ModelDef {
        name: name.unwrap_or_else(|| ident.to_string()),
        ident,
        doc: doc_text(&input.attrs),
        json_schema,
        body,
    })
}

fn parse_enum(ident: &syn::Ident, data: syn::DataEnum, json_schema: bool) -> syn::Result<ModelBody> {
    let mut alternatives = Vec::new();
    for variant in data.variants {
        match variant.fields {
            syn::Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                alternatives.extend(fields.unnamed.into_iter().map(|field| field.ty));
            }
            _ if json_schema => return Ok(ModelBody::Opaque),
            _ => {
                return Err(syn::Error::new(
                    variant.ident.span(),
                    format!(
                        "variant `{}` of `{ident}` must wrap exactly one type to be documented \
                         as a union; add #[model(json_schema)] to document other enums",
                        variant.ident
                    ),
                ))
            }
        }
    }
    Ok(ModelBody::Union(alternatives))
}

/// Parse one named field, or `None` for `#[field(skip)]`.
fn parse_field(field: syn::Field) -> syn::Result<Option<FieldDef>> {
    let Some(ident) = field.ident else {
        return Err(syn::Error::new_spanned(&field.ty, "expected a named field"));
    };

    let mut name = None;
    let mut required = None;
    let mut description = None;
    let mut example = None;
    let mut choices = None;
    let mut skip = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else if meta.path.is_ident("required") {
                required = Some(if meta.input.peek(syn::Token![=]) {
                    meta.value()?.parse::<syn::LitBool>()?.value
                } else {
                    true
                });
                Ok(())
            } else if meta.path.is_ident("name") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("description") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                description = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("example") {
                example = Some(meta.value()?.parse::<syn::Expr>()?);
                Ok(())
            } else if meta.path.is_ident("choices") {
                let content;
                syn::parenthesized!(content in meta.input);
                let values = content.parse_terminated(syn::Expr::parse, syn::Token![,])?;
                choices = Some(values.into_iter().collect());
                Ok(())
            } else {
                Err(meta.error(
                    "unknown attribute in #[field(...)]: expected `name`, `description`, \
                     `required`, `example`, `choices` or `skip`",
                ))
            }
        })?;
    }

    if skip {
        return Ok(None);
    }

    Ok(Some(FieldDef {
        name: name.unwrap_or_else(|| unraw(&ident)),
        required: required.unwrap_or_else(|| !is_option_type(&field.ty)),
        description: description.or_else(|| doc_text(&field.attrs).map(|d| d.trim().to_string())),
        ty: field.ty,
        example,
        choices,
    }))
}

fn unraw(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
}

/// Check if a type is `Option<T>`.
fn is_option_type(ty: &syn::Type) -> bool {
    if let syn::Type::Path(syn::TypePath { path, .. }) = ty {
        if let Some(seg) = path.segments.last() {
            return seg.ident == "Option";
        }
    }
    false
}

/// Join `///` lines with newlines, dropping the single space rustdoc puts
/// after the slashes so indentation inside the text survives.
fn doc_text(attrs: &[syn::Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let syn::Meta::NameValue(nv) = &attr.meta {
                if let syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) = &nv.value
                {
                    let line = s.value();
                    return Some(line.strip_prefix(' ').map(str::to_string).unwrap_or(line));
                }
            }
            None
        })
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
