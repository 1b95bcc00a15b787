//! Oxigraph-based SPARQL engine.
//!
//! Evaluates the archive queries in-process against an in-memory store loaded
//! from RDF files. This is how fixture graphs are checked without a running
//! endpoint, and it yields the same [`ResultSet`] shape as the HTTP path.
//!
//! # Example
//!
//! ```ignore
//! use konzertarchiv::querying::oxigraph_adapter::OxigraphEngine;
//!
//! let engine = OxigraphEngine::new()?;
//! engine.load_file("tests/fixtures/archive.trig".as_ref())?;
//! let rows = engine.select_sync("SELECT ?s WHERE { GRAPH ?g { ?s ?p ?o } }")?;
//! ```

use crate::error::{Result, RunnerError};
use crate::querying::query_processing::SparqlEngine;
use crate::results::{ResultSet, Row, Term, XSD_STRING};
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{NamedNode, Quad, Term as OxTerm};
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct OxigraphEngine {
    store: Store,
}

impl OxigraphEngine {
    pub fn new() -> Result<Self> {
        Ok(Self { store: Store::new()? })
    }

    /// Create a store holding the contents of every file in `paths`.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let engine = Self::new()?;
        for path in paths {
            engine.load_file(path.as_ref())?;
        }
        Ok(engine)
    }

    /// Load a file, picking the syntax from its extension. Triples from
    /// Turtle or N-Triples land in the default graph.
    pub fn load_file(&self, path: &Path) -> Result<()> {
        let format = format_for(path)?;
        let reader = BufReader::new(File::open(path)?);
        self.store.load_from_reader(format, reader)?;
        tracing::debug!(path = %path.display(), "loaded RDF file");
        Ok(())
    }

    /// Load a triples file into the named graph `graph_iri`.
    pub fn load_file_into_graph(&self, path: &Path, graph_iri: &str) -> Result<()> {
        let format = format_for(path)?;
        let graph = NamedNode::new(graph_iri)
            .map_err(|e| RunnerError::Config(format!("invalid graph IRI {}: {}", graph_iri, e)))?;
        let parser = RdfParser::from_format(format).with_default_graph(graph);
        let reader = BufReader::new(File::open(path)?);
        self.store.load_from_reader(parser, reader)?;
        tracing::debug!(path = %path.display(), graph = graph_iri, "loaded RDF file into graph");
        Ok(())
    }

    pub fn insert(&self, quad: &Quad) -> Result<()> {
        self.store.insert(quad)?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.store.len()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.store.is_empty()?)
    }

    /// Evaluate a SELECT query synchronously.
    pub fn select_sync(&self, query: &str) -> Result<ResultSet> {
        let evaluator = SparqlEvaluator::new();
        let parsed_query = evaluator
            .parse_query(query)
            .map_err(|e| RunnerError::QuerySyntaxError(e.to_string()))?;
        let results = parsed_query.on_store(&self.store).execute()?;

        let QueryResults::Solutions(solutions) = results else {
            return Err(RunnerError::UnexpectedResultShape(
                "query did not produce solutions".to_string(),
            ));
        };

        let variables = solutions.variables().iter().map(|v| v.as_str().to_string()).collect();
        let mut result_set = ResultSet::new(variables);

        for solution in solutions {
            let solution = solution?;
            let mut row = Row::new();
            for (var, term) in solution.iter() {
                row.insert(var.as_str(), convert_term(term));
            }
            result_set.rows.push(row);
        }

        Ok(result_set)
    }
}

impl SparqlEngine for OxigraphEngine {
    fn describe(&self) -> String {
        "in-memory oxigraph store".to_string()
    }

    async fn select(&self, query: &str) -> Result<ResultSet> {
        self.select_sync(query)
    }
}

fn format_for(path: &Path) -> Result<RdfFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(RdfFormat::from_extension)
        .ok_or_else(|| {
            RunnerError::Config(format!("cannot tell RDF syntax of {}", path.display()))
        })
}

fn convert_term(term: &OxTerm) -> Term {
    match term {
        OxTerm::NamedNode(node) => Term::Iri(node.as_str().to_string()),
        OxTerm::BlankNode(node) => Term::BlankNode(node.as_str().to_string()),
        OxTerm::Literal(literal) => {
            let language = literal.language().map(str::to_string);
            let datatype = literal.datatype().as_str();
            let datatype = if language.is_some() || datatype == XSD_STRING {
                None
            } else {
                Some(datatype.to_string())
            };
            Term::Literal { value: literal.value().to_string(), datatype, language }
        }
        #[allow(unreachable_patterns)]
        other => Term::simple_literal(other.to_string()),
    }
}
