use axum::Router;
use serde_json::Value;
use swaggen_core::{DocConfig, DocError, DocumentBuilder, RouteSource, RouteSpecTable};
use tracing::info;

use crate::handlers::{openapi_routes, spec_path};
use crate::router::DocumentedRouter;
use crate::spec_cell::SpecCell;

/// Document settings and handler annotations, waiting for a route table.
pub struct ApiDocs {
    config: DocConfig,
    specs: RouteSpecTable,
    cell: SpecCell,
}

impl ApiDocs {
    pub fn new(config: DocConfig, specs: RouteSpecTable) -> Self {
        Self {
            config,
            specs,
            cell: SpecCell::new(),
        }
    }

    pub fn config(&self) -> &DocConfig {
        &self.config
    }

    /// The slot the served document is read from.
    pub fn cell(&self) -> SpecCell {
        self.cell.clone()
    }

    /// Build the document for `routes` without publishing it.
    pub fn build(&self, routes: &dyn RouteSource) -> Result<Value, DocError> {
        DocumentBuilder::new().build(&self.config, &self.specs, routes)
    }

    /// Build the document once, publish it and mount `<prefix>/spec.json`
    /// next to the documented routes.
    ///
    /// # Errors
    ///
    /// The [`DocError`] that stopped the build or its serialization;
    /// nothing is served then.
    pub fn install<S>(self, router: DocumentedRouter<S>) -> Result<Router<S>, DocError>
    where
        S: Clone + Send + Sync + 'static,
    {
        let (router, routes) = router.into_parts();
        let document = self.build(&routes)?;
        self.cell.publish(&document)?;
        info!(
            path = %spec_path(&self.config.docs_prefix),
            title = %self.config.title,
            "serving API document"
        );
        Ok(router.merge(openapi_routes(&self.config.docs_prefix, self.cell)))
    }
}
