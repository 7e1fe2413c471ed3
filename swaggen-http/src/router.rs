//! An axum router that records what it routes.
//!
//! Every route is registered twice: with axum, at the `{name}` form of its
//! URI, and in a [`RouteTable`] under its `<name:cast>` form, which keeps the
//! path-parameter casts the document needs.

use axum::handler::Handler;
use axum::routing::{self, MethodRouter};
use axum::Router;
use swaggen_core::{templated_path, HandlerId, RouteEntry, RouteTable};
use tracing::debug;

pub struct DocumentedRouter<S = ()> {
    router: Router<S>,
    routes: RouteTable,
    prefix: String,
    group: Option<String>,
}

impl<S> DocumentedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            routes: RouteTable::new(),
            prefix: String::new(),
            group: None,
        }
    }

    pub fn get<H, T>(self, id: impl Into<HandlerId>, uri: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route("GET", id.into(), uri, routing::get(handler))
    }

    pub fn post<H, T>(self, id: impl Into<HandlerId>, uri: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route("POST", id.into(), uri, routing::post(handler))
    }

    pub fn put<H, T>(self, id: impl Into<HandlerId>, uri: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route("PUT", id.into(), uri, routing::put(handler))
    }

    pub fn patch<H, T>(self, id: impl Into<HandlerId>, uri: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route("PATCH", id.into(), uri, routing::patch(handler))
    }

    pub fn delete<H, T>(self, id: impl Into<HandlerId>, uri: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route("DELETE", id.into(), uri, routing::delete(handler))
    }

    /// Register the routes added by `f` under `prefix`, as members of the
    /// group `name`. The group name is their default tag.
    pub fn group<F>(mut self, name: &str, prefix: &str, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.routes.group_mut(name);
        let outer_group = self.group.replace(name.to_string());
        let outer_prefix = self.prefix.clone();
        self.prefix.push_str(prefix);

        let mut router = f(self);
        router.group = outer_group;
        router.prefix = outer_prefix;
        router
    }

    /// The routes recorded so far.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Split into the axum router and the recorded route table.
    pub fn into_parts(self) -> (Router<S>, RouteTable) {
        (self.router, self.routes)
    }

    fn route(
        mut self,
        method: &str,
        id: HandlerId,
        uri: &str,
        method_router: MethodRouter<S>,
    ) -> Self {
        let uri = format!("{}{}", self.prefix, uri);
        let path = templated_path(&uri);
        debug!(method, path = %path, handler = %id, "documented route");

        self.router = self.router.route(&path, method_router);
        self.routes.add(RouteEntry::new(uri, id.as_str(), [method], id.clone()));
        if let Some(group) = &self.group {
            self.routes.add_to_group(group, id);
        }
        self
    }
}

impl<S> Default for DocumentedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
