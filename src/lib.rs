//! # Konzertarchiv
//!
//! Konzertarchiv runs a small, fixed set of SPARQL queries that line up the
//! New Year's Concert recordings of a music archive (Music Ontology releases
//! and tracks) with the historical concert programmes of the Musikverein
//! archive.
//!
//! ## Features
//!
//! - The three archive queries, embedded, with their projected-variable contract
//! - SPARQL 1.1 Protocol client for remote endpoints
//! - In-process evaluation over an oxigraph store for fixture graphs
//! - Verification of row-level guarantees and a year-by-year comparison report
//! - Cue sheet parsing for ripped concert discs
//!
//! ## Example
//!
//! ```no_run
//! use konzertarchiv::queries::NamedQuery;
//! use konzertarchiv::querying::http_endpoint::{HttpEndpoint, SparqlEndpoint};
//! use konzertarchiv::querying::query_processing::QueryRunner;
//!
//! # async fn example() -> konzertarchiv::Result<()> {
//! let engine = HttpEndpoint::new(SparqlEndpoint::new("http://localhost:3030/archive/sparql"))?;
//! let runner = QueryRunner::new(engine);
//! let rows = runner.execute(NamedQuery::DanubeTracks).await?;
//! println!("{} Danube titles", rows.len());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod checks;
pub mod comparison;
pub mod config;
pub mod error;

/// Cue sheet parsing
pub mod parsing;

/// The fixed archive queries
pub mod queries;

/// Engines and the query runner
pub mod querying;

/// Result sets, SPARQL JSON results and rendering
pub mod results;

// Re-export commonly used types
pub use error::{Result, RunnerError};
pub use queries::NamedQuery;
pub use results::{ResultSet, Row, Term};
