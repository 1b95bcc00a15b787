//! SPARQL 1.1 Protocol client for remote endpoints (Fuseki, GraphDB, Oxigraph
//! server, Virtuoso, ...).

use crate::error::{Result, RunnerError};
use crate::querying::query_processing::SparqlEngine;
use crate::results::{json, ResultSet};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the query is put on the wire (SPARQL 1.1 Protocol, section 2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum QueryTransport {
    /// `GET` with a URL-encoded `query` parameter
    Get,
    /// `POST` with a form-encoded body
    #[default]
    PostForm,
    /// `POST` with an `application/sparql-query` body
    PostDirect,
}

/// Configuration for a SPARQL query endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparqlEndpoint {
    pub url: String,
    #[serde(default)]
    pub transport: QueryTransport,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl SparqlEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transport: QueryTransport::default(),
            auth_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_transport(mut self, transport: QueryTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// HTTP engine answering SELECT queries from a remote endpoint
pub struct HttpEndpoint {
    endpoint: SparqlEndpoint,
    client: Client,
}

impl HttpEndpoint {
    pub fn new(endpoint: SparqlEndpoint) -> Result<Self> {
        let url = reqwest::Url::parse(&endpoint.url)
            .map_err(|e| RunnerError::Config(format!("bad endpoint URL {}: {}", endpoint.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RunnerError::Config(format!(
                "endpoint URL must be http(s): {}",
                endpoint.url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .map_err(|e| RunnerError::Config(e.to_string()))?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &SparqlEndpoint {
        &self.endpoint
    }

    /// Check whether the endpoint answers a trivial ASK query.
    pub async fn ping(&self) -> Result<bool> {
        let response = self.send("ASK {}").await?;
        Ok(response.status().is_success())
    }

    async fn send(&self, query: &str) -> Result<Response> {
        let request = match self.endpoint.transport {
            QueryTransport::Get => self.client.get(&self.endpoint.url).query(&[("query", query)]),
            QueryTransport::PostForm => {
                self.client.post(&self.endpoint.url).form(&[("query", query)])
            }
            QueryTransport::PostDirect => self
                .client
                .post(&self.endpoint.url)
                .header(CONTENT_TYPE, "application/sparql-query")
                .body(query.to_string()),
        };

        let request = self.add_auth_header(request).header(ACCEPT, json::MEDIA_TYPE);

        tracing::debug!(
            url = %self.endpoint.url,
            transport = ?self.endpoint.transport,
            "sending SPARQL request"
        );

        request.send().await.map_err(|e| {
            RunnerError::EndpointUnavailable(format!("{}: {}", self.endpoint.url, e))
        })
    }

    fn add_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.endpoint.auth_token {
            request.header(AUTHORIZATION, format!("Bearer {}", token))
        } else {
            request
        }
    }
}

impl SparqlEngine for HttpEndpoint {
    fn describe(&self) -> String {
        self.endpoint.url.clone()
    }

    async fn select(&self, query: &str) -> Result<ResultSet> {
        let response = self.send(query).await?;
        let status = response.status();

        if !status.is_success() {
            let error_body =
                response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, error_body));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.bytes().await.map_err(|e| {
            RunnerError::EndpointUnavailable(format!("reading response body failed: {}", e))
        })?;

        json::parse_select(&body).map_err(|e| match e {
            RunnerError::UnexpectedResultShape(msg) if !content_type.is_empty() => {
                RunnerError::UnexpectedResultShape(format!("{} (content type {})", msg, content_type))
            }
            other => other,
        })
    }
}

fn status_error(status: StatusCode, body: String) -> RunnerError {
    if status == StatusCode::BAD_REQUEST {
        RunnerError::QuerySyntaxError(body)
    } else {
        RunnerError::EndpointUnavailable(format!("query failed with status {}: {}", status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_defaults() {
        let endpoint = SparqlEndpoint::new("http://localhost:3030/archive/sparql");
        assert_eq!(endpoint.transport, QueryTransport::PostForm);
        assert_eq!(endpoint.timeout_secs, 30);
        assert!(endpoint.auth_token.is_none());
    }

    #[test]
    fn test_endpoint_from_json_fills_defaults() {
        let endpoint: SparqlEndpoint = serde_json::from_str(
            r#"{ "url": "http://localhost:7878/query", "transport": "post-direct" }"#,
        )
        .unwrap();
        assert_eq!(endpoint.transport, QueryTransport::PostDirect);
        assert_eq!(endpoint.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = HttpEndpoint::new(SparqlEndpoint::new("ftp://example.org/sparql")).err().unwrap();
        assert_eq!(err.kind(), "Config");

        let err = HttpEndpoint::new(SparqlEndpoint::new("localhost:3030/sparql")).err().unwrap();
        assert_eq!(err.kind(), "Config");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert!(HttpEndpoint::new(SparqlEndpoint::new("HTTP://localhost:3030/archive/sparql")).is_ok());
        assert!(HttpEndpoint::new(SparqlEndpoint::new("Https://example.org/sparql")).is_ok());
    }

    #[test]
    fn test_status_mapping() {
        let err = status_error(StatusCode::BAD_REQUEST, "Parse error line 1".to_string());
        assert_eq!(err.kind(), "QuerySyntaxError");
        assert!(err.to_string().contains("Parse error line 1"));

        let err = status_error(StatusCode::SERVICE_UNAVAILABLE, String::new());
        assert_eq!(err.kind(), "EndpointUnavailable");
        assert!(err.to_string().contains("503"));
    }
}
