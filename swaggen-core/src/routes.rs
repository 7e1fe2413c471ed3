//! The route table the document is assembled from.
//!
//! URIs use `<name>` or `<name:cast>` placeholders for path parameters;
//! [`templated_path`] rewrites them to the `{name}` notation used by both
//! Swagger and axum.

use crate::route_spec::HandlerId;
use crate::shape::{Primitive, TypeShape};

/// A path parameter and the scalar type it is cast to.
#[derive(Debug, Clone)]
pub struct PathParam {
    pub name: String,
    pub cast: TypeShape,
}

impl PathParam {
    /// Map a placeholder cast (`int`, `number`, `float`, `ymd`, ...) to a shape.
    /// Unknown or missing casts are strings.
    pub fn new(name: impl Into<String>, cast: Option<&str>) -> Self {
        let primitive = match cast.map(str::trim) {
            Some("int") => Primitive::Integer,
            Some("number" | "float") => Primitive::Float,
            Some("ymd") => Primitive::Date,
            _ => Primitive::String,
        };
        PathParam {
            name: name.into(),
            cast: TypeShape::Primitive(primitive),
        }
    }
}

/// The handler(s) behind one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteHandlers {
    /// One handler bound to every listed method.
    Single {
        methods: Vec<String>,
        handler: HandlerId,
    },
    /// A method-specific handler per method.
    Composite(Vec<(String, HandlerId)>),
}

impl RouteHandlers {
    /// One `(METHOD, handler)` pair per operation, methods upper-cased.
    pub fn expand(&self) -> Vec<(String, HandlerId)> {
        match self {
            RouteHandlers::Single { methods, handler } => methods
                .iter()
                .map(|method| (method.to_uppercase(), handler.clone()))
                .collect(),
            RouteHandlers::Composite(handlers) => handlers
                .iter()
                .map(|(method, handler)| (method.to_uppercase(), handler.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub uri: String,
    /// Route name, the fallback operation id.
    pub name: String,
    pub parameters: Vec<PathParam>,
    pub handlers: RouteHandlers,
}

impl RouteEntry {
    /// A route with one handler bound to `methods`.
    pub fn new<I, S>(
        uri: impl Into<String>,
        name: impl Into<String>,
        methods: I,
        handler: impl Into<HandlerId>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let handlers = RouteHandlers::Single {
            methods: methods.into_iter().map(Into::into).collect(),
            handler: handler.into(),
        };
        Self::with_handlers(uri.into(), name.into(), handlers)
    }

    /// A route with a handler per method.
    pub fn composite(
        uri: impl Into<String>,
        name: impl Into<String>,
        handlers: Vec<(String, HandlerId)>,
    ) -> Self {
        Self::with_handlers(uri.into(), name.into(), RouteHandlers::Composite(handlers))
    }

    fn with_handlers(uri: String, name: String, handlers: RouteHandlers) -> Self {
        let parameters = placeholders(&uri)
            .into_iter()
            .map(|(name, cast)| PathParam::new(name, cast))
            .collect();
        RouteEntry {
            uri,
            name,
            parameters,
            handlers,
        }
    }

    pub fn templated_path(&self) -> String {
        templated_path(&self.uri)
    }
}

/// A named grouping of handlers; its name is their default tag.
#[derive(Debug, Clone, Default)]
pub struct RouteGroup {
    pub name: String,
    pub handlers: Vec<HandlerId>,
}

impl RouteGroup {
    pub fn new(name: impl Into<String>) -> Self {
        RouteGroup {
            name: name.into(),
            handlers: Vec::new(),
        }
    }

    pub fn contains(&self, handler: &HandlerId) -> bool {
        self.handlers.contains(handler)
    }
}

/// Anything that can enumerate its routes and route groups.
pub trait RouteSource {
    fn routes(&self) -> &[RouteEntry];

    fn groups(&self) -> &[RouteGroup] {
        &[]
    }
}

/// In-memory route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
    groups: Vec<RouteGroup>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: RouteEntry) -> &mut Self {
        self.routes.push(entry);
        self
    }

    /// Bind `handler` to `method` on `uri`. A second method on a known URI
    /// turns its entry into a composite.
    pub fn add_method(
        &mut self,
        uri: &str,
        name: &str,
        method: &str,
        handler: impl Into<HandlerId>,
    ) -> &mut Self {
        let method = method.to_uppercase();
        let handler = handler.into();
        match self.routes.iter_mut().find(|entry| entry.uri == uri) {
            Some(entry) => {
                let mut handlers = entry.handlers.expand();
                handlers.push((method, handler));
                entry.handlers = RouteHandlers::Composite(handlers);
            }
            None => {
                self.routes.push(RouteEntry::new(uri, name, [method], handler));
            }
        }
        self
    }

    /// The group called `name`, created on first use.
    pub fn group_mut(&mut self, name: &str) -> &mut RouteGroup {
        let position = match self.groups.iter().position(|group| group.name == name) {
            Some(position) => position,
            None => {
                self.groups.push(RouteGroup::new(name));
                self.groups.len() - 1
            }
        };
        &mut self.groups[position]
    }

    pub fn add_to_group(&mut self, name: &str, handler: impl Into<HandlerId>) -> &mut Self {
        let handler = handler.into();
        let group = self.group_mut(name);
        if !group.contains(&handler) {
            group.handlers.push(handler);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteSource for RouteTable {
    fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    fn groups(&self) -> &[RouteGroup] {
        &self.groups
    }
}

/// `(name, cast)` of every `<name[:cast]>` placeholder in `uri`.
fn placeholders(uri: &str) -> Vec<(&str, Option<&str>)> {
    let mut out = Vec::new();
    let mut rest = uri;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let inner = &rest[start + 1..start + len];
        match inner.split_once(':') {
            Some((name, cast)) => out.push((name.trim(), Some(cast))),
            None => out.push((inner.trim(), None)),
        }
        rest = &rest[start + len + 1..];
    }
    out
}

/// Rewrite `<name>` and `<name:cast>` placeholders to `{name}`.
pub fn templated_path(uri: &str) -> String {
    let mut out = String::with_capacity(uri.len());
    let mut rest = uri;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let inner = &rest[start + 1..start + len];
        let name = inner.split_once(':').map_or(inner, |(name, _)| name).trim();
        out.push_str(&rest[..start]);
        out.push('{');
        out.push_str(name);
        out.push('}');
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}
