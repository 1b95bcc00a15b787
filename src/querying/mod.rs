//! Query execution: the engine seam and its two implementations.

pub mod http_endpoint;
pub mod oxigraph_adapter;
pub mod query_processing;

use crate::error::Result;
use crate::results::ResultSet;
use http_endpoint::HttpEndpoint;
use oxigraph_adapter::OxigraphEngine;
use query_processing::SparqlEngine;

/// Engine picked at runtime from configuration.
pub enum AnyEngine {
    Http(HttpEndpoint),
    Local(OxigraphEngine),
}

impl SparqlEngine for AnyEngine {
    fn describe(&self) -> String {
        match self {
            AnyEngine::Http(engine) => engine.describe(),
            AnyEngine::Local(engine) => engine.describe(),
        }
    }

    async fn select(&self, query: &str) -> Result<ResultSet> {
        match self {
            AnyEngine::Http(engine) => engine.select(query).await,
            AnyEngine::Local(engine) => engine.select(query).await,
        }
    }
}
