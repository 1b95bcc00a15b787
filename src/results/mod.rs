//! Tabular SPARQL SELECT results.
//!
//! A [`ResultSet`] is what every engine hands back: the projected variables in
//! the order the query declares them, and the solution rows in the order the
//! engine produced them. Rows map a variable to a [`Term`] or leave it unbound.

pub mod json;
pub mod render;

use crate::error::{Result, RunnerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// An RDF term bound to a result variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    Iri(String),
    BlankNode(String),
    Literal { value: String, datatype: Option<String>, language: Option<String> },
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri(value.into())
    }

    pub fn simple_literal(value: impl Into<String>) -> Self {
        Term::Literal { value: value.into(), datatype: None, language: None }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal { value: value.into(), datatype: Some(datatype.into()), language: None }
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal { value: value.into(), datatype: None, language: Some(language.into()) }
    }

    /// The lexical form: IRI string, blank node label or literal value.
    pub fn lexical(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::BlankNode(id) => id,
            Term::Literal { value, .. } => value,
        }
    }

    /// Interpret the term as an `xsd:boolean` literal.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Term::Literal { value, datatype: Some(dt), .. } if dt == XSD_BOOLEAN => {
                match value.as_str() {
                    "true" | "1" => Some(true),
                    "false" | "0" => Some(false),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Interpret the term's lexical form as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Term::Literal { value, .. } => value.trim().parse().ok(),
            _ => None,
        }
    }
}

/// N-Triples style rendering, which is also the SPARQL TSV term syntax.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(id) => write!(f, "_:{}", id),
            Term::Literal { value, datatype, language } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)
                } else {
                    match datatype.as_deref() {
                        None | Some(XSD_STRING) => Ok(()),
                        Some(dt) => write!(f, "^^<{}>", dt),
                    }
                }
            }
        }
    }
}

fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// One solution: variable name to bound term. Unbound variables are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    bindings: BTreeMap<String, Term>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, variable: impl Into<String>, term: Term) -> Self {
        self.insert(variable, term);
        self
    }

    pub fn insert(&mut self, variable: impl Into<String>, term: Term) {
        self.bindings.insert(variable.into(), term);
    }

    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.bindings.get(variable)
    }

    /// Lexical form of a bound variable, if any.
    pub fn lexical(&self, variable: &str) -> Option<&str> {
        self.get(variable).map(Term::lexical)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Ordered rows of a SELECT query together with the projected variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub variables: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(variables: Vec<String>) -> Self {
        Self { variables, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Check that the result set projects exactly `expected`, in order, and
    /// that no row binds a variable outside the projection.
    pub fn validate_shape(&self, expected: &[&str]) -> Result<()> {
        let actual: Vec<&str> = self.variables.iter().map(String::as_str).collect();
        if actual != expected {
            return Err(RunnerError::UnexpectedResultShape(format!(
                "expected variables {:?}, got {:?}",
                expected, actual
            )));
        }

        for (index, row) in self.rows.iter().enumerate() {
            if let Some(stray) = row.variables().find(|v| !expected.contains(v)) {
                return Err(RunnerError::UnexpectedResultShape(format!(
                    "row {} binds unprojected variable ?{}",
                    index, stray
                )));
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
