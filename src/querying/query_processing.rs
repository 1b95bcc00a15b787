use crate::error::Result;
use crate::queries::{NamedQuery, QueryCatalog};
use crate::results::ResultSet;
use futures_util::future::join_all;
use std::time::Instant;

/// Anything that can answer a SPARQL SELECT query with a tabular result.
#[allow(async_fn_in_trait)]
pub trait SparqlEngine {
    /// Short description for logs, e.g. the endpoint URL.
    fn describe(&self) -> String;

    /// Evaluate `query` and return its rows in engine order.
    async fn select(&self, query: &str) -> Result<ResultSet>;
}

/// Runs the archive queries against an engine and checks each result against
/// the query's projected variables.
pub struct QueryRunner<E: SparqlEngine> {
    engine: E,
    catalog: QueryCatalog,
}

impl<E: SparqlEngine> QueryRunner<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, catalog: QueryCatalog::embedded() }
    }

    pub fn with_catalog(engine: E, catalog: QueryCatalog) -> Self {
        Self { engine, catalog }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    /// One round trip for one query. No retries.
    pub async fn execute(&self, query: NamedQuery) -> Result<ResultSet> {
        let text = self.catalog.text(query)?;
        tracing::debug!(query = %query, engine = %self.engine.describe(), "executing query");

        let started = Instant::now();
        let results = self.engine.select(&text).await?;
        results.validate_shape(query.projected_variables())?;

        tracing::info!(
            query = %query,
            rows = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query completed"
        );
        Ok(results)
    }

    /// Execute arbitrary query text without a projection contract.
    pub async fn execute_text(&self, text: &str) -> Result<ResultSet> {
        self.engine.select(text).await
    }

    /// Issue all three queries concurrently. Each outcome is independent.
    pub async fn execute_all(&self) -> Vec<(NamedQuery, Result<ResultSet>)> {
        let outcomes = join_all(NamedQuery::ALL.iter().map(|q| self.execute(*q))).await;
        NamedQuery::ALL.into_iter().zip(outcomes).collect()
    }
}
