//! SPARQL 1.1 Query Results JSON Format.
//!
//! Parsing accepts what common endpoints emit, including the legacy
//! `typed-literal` term type. Serialising is deterministic: variables keep the
//! projection order and binding objects are keyed in sorted order.

use super::{ResultSet, Row, Term, RDF_LANG_STRING, XSD_STRING};
use crate::error::{Result, RunnerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MEDIA_TYPE: &str = "application/sparql-results+json";

#[derive(Debug, Serialize, Deserialize)]
struct JsonDocument {
    head: JsonHead,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    results: Option<JsonBindings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    boolean: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonBindings {
    bindings: Vec<BTreeMap<String, JsonTerm>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonTerm {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<String>,
}

impl JsonTerm {
    fn into_term(self) -> Result<Term> {
        match self.kind.as_str() {
            "uri" => Ok(Term::Iri(self.value)),
            "bnode" => Ok(Term::BlankNode(self.value)),
            "literal" | "typed-literal" => {
                let datatype = self.datatype.filter(|dt| dt != RDF_LANG_STRING && dt != XSD_STRING);
                Ok(Term::Literal { value: self.value, datatype, language: self.lang })
            }
            other => Err(RunnerError::UnexpectedResultShape(format!(
                "unknown term type '{}'",
                other
            ))),
        }
    }

    fn from_term(term: &Term) -> Self {
        match term {
            Term::Iri(iri) => {
                JsonTerm { kind: "uri".into(), value: iri.clone(), lang: None, datatype: None }
            }
            Term::BlankNode(id) => {
                JsonTerm { kind: "bnode".into(), value: id.clone(), lang: None, datatype: None }
            }
            Term::Literal { value, datatype, language } => JsonTerm {
                kind: "literal".into(),
                value: value.clone(),
                lang: language.clone(),
                datatype: if language.is_some() { None } else { datatype.clone() },
            },
        }
    }
}

/// Parse a SELECT result document. ASK results and anything that is not a
/// results document are rejected as an unexpected shape.
pub fn parse_select(body: &[u8]) -> Result<ResultSet> {
    let document: JsonDocument = serde_json::from_slice(body).map_err(|e| {
        RunnerError::UnexpectedResultShape(format!("not a SPARQL JSON results document: {}", e))
    })?;

    if document.boolean.is_some() {
        return Err(RunnerError::UnexpectedResultShape(
            "boolean result returned for a SELECT query".to_string(),
        ));
    }

    let bindings = document.results.ok_or_else(|| {
        RunnerError::UnexpectedResultShape("results section is missing".to_string())
    })?;

    let mut result_set = ResultSet::new(document.head.vars);
    for binding in bindings.bindings {
        let mut row = Row::new();
        for (variable, term) in binding {
            row.insert(variable, term.into_term()?);
        }
        result_set.rows.push(row);
    }

    Ok(result_set)
}

/// Serialise a result set as a SPARQL JSON results document.
pub fn to_string(results: &ResultSet) -> Result<String> {
    let document = JsonDocument {
        head: JsonHead { vars: results.variables.clone() },
        results: Some(JsonBindings {
            bindings: results
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(variable, term)| (variable.to_string(), JsonTerm::from_term(term)))
                        .collect()
                })
                .collect(),
        }),
        boolean: None,
    };

    Ok(serde_json::to_string_pretty(&document)?)
}
