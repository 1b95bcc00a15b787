//! Runner configuration.
//!
//! Values come from an optional JSON file and are then overridden by command
//! line flags (which clap may in turn fill from environment variables).

use crate::error::{Result, RunnerError};
use crate::queries::{QueryCatalog, DEFAULT_BASE_IRI};
use crate::querying::http_endpoint::{
    HttpEndpoint, QueryTransport, SparqlEndpoint, DEFAULT_TIMEOUT_SECS,
};
use crate::querying::oxigraph_adapter::OxigraphEngine;
use crate::querying::AnyEngine;
use crate::results::render::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// SPARQL query endpoint URL
    pub endpoint: Option<String>,
    pub transport: QueryTransport,
    pub timeout_secs: u64,
    pub auth_token: Option<String>,
    /// Base IRI prepended as `BASE`; `None` leaves resolution to the endpoint
    pub base_iri: Option<String>,
    /// Directory of `.rq` files overriding the embedded queries
    pub query_dir: Option<PathBuf>,
    /// RDF files for the local engine; when set, no endpoint is contacted
    pub data_files: Vec<PathBuf>,
    pub format: OutputFormat,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            transport: QueryTransport::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth_token: None,
            base_iri: Some(DEFAULT_BASE_IRI.to_string()),
            query_dir: None,
            data_files: Vec::new(),
            format: OutputFormat::default(),
        }
    }
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub transport: Option<QueryTransport>,
    pub timeout_secs: Option<u64>,
    pub auth_token: Option<String>,
    /// An empty string clears the base IRI
    pub base_iri: Option<String>,
    pub query_dir: Option<PathBuf>,
    pub data_files: Vec<PathBuf>,
    pub format: Option<OutputFormat>,
}

impl RunnerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RunnerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| RunnerError::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = Some(endpoint);
        }
        if let Some(transport) = overrides.transport {
            self.transport = transport;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(token) = overrides.auth_token {
            self.auth_token = Some(token);
        }
        if let Some(base) = overrides.base_iri {
            self.base_iri = if base.is_empty() { None } else { Some(base) };
        }
        if let Some(dir) = overrides.query_dir {
            self.query_dir = Some(dir);
        }
        if !overrides.data_files.is_empty() {
            self.data_files = overrides.data_files;
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        self
    }

    pub fn catalog(&self) -> QueryCatalog {
        let catalog = match &self.query_dir {
            Some(dir) => QueryCatalog::from_directory(dir),
            None => QueryCatalog::embedded(),
        };
        catalog.with_base_iri(self.base_iri.clone())
    }

    pub fn sparql_endpoint(&self) -> Result<SparqlEndpoint> {
        let url = self.endpoint.clone().ok_or_else(|| {
            RunnerError::Config("no SPARQL endpoint configured (use --endpoint or --data)".into())
        })?;
        Ok(SparqlEndpoint::new(url)
            .with_transport(self.transport)
            .with_auth_token(self.auth_token.clone())
            .with_timeout_secs(self.timeout_secs))
    }

    /// Local engine when data files are configured, HTTP otherwise.
    pub fn build_engine(&self) -> Result<AnyEngine> {
        if !self.data_files.is_empty() {
            if self.base_iri.is_none() {
                return Err(RunnerError::Config(
                    "the local engine needs a base IRI to resolve graph names".into(),
                ));
            }
            return Ok(AnyEngine::Local(OxigraphEngine::from_files(&self.data_files)?));
        }
        Ok(AnyEngine::Http(HttpEndpoint::new(self.sparql_endpoint()?)?))
    }
}
