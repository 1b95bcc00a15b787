//! The fixed archive queries.
//!
//! Each query ships as a `.rq` file under `queries/` and is embedded at build
//! time. A [`QueryCatalog`] can point at a directory holding edited copies of
//! the same files; whatever text it returns, the projected-variable contract of
//! the [`NamedQuery`] stays the same and results are validated against it.

use crate::error::{Result, RunnerError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Base IRI used to resolve the relative `repertoire_20220201` graph name.
pub const DEFAULT_BASE_IRI: &str = "http://neujahrskonzert.local/graph/";

/// IRI prefix of New Year's Concert releases; the year follows it.
pub const RELEASE_PREFIX: &str = "http://neujahrskonzert.local/release/Neujahrskonzerte/";

pub const RECORDING_GRAPH: &str = "repertoire_20220201";
pub const PROGRAMME_GRAPH: &str = "https://www.musikverein.at/konzertarchiv";

/// One of the three archive queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamedQuery {
    /// Query A: tracks of New Year's Concert releases with their year.
    NewYearsReleases,
    /// Query B: programme items of concerts held on 1 January.
    NewYearsProgrammes,
    /// Query C: Danube titles flagged by New Year's Concert membership.
    DanubeTracks,
}

impl NamedQuery {
    pub const ALL: [NamedQuery; 3] =
        [NamedQuery::NewYearsReleases, NamedQuery::NewYearsProgrammes, NamedQuery::DanubeTracks];

    pub fn name(self) -> &'static str {
        match self {
            NamedQuery::NewYearsReleases => "new-years-releases",
            NamedQuery::NewYearsProgrammes => "new-years-programmes",
            NamedQuery::DanubeTracks => "danube-tracks",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            NamedQuery::NewYearsReleases => "new_years_releases.rq",
            NamedQuery::NewYearsProgrammes => "new_years_programmes.rq",
            NamedQuery::DanubeTracks => "danube_tracks.rq",
        }
    }

    /// The embedded query text.
    pub fn text(self) -> &'static str {
        match self {
            NamedQuery::NewYearsReleases => include_str!("../../queries/new_years_releases.rq"),
            NamedQuery::NewYearsProgrammes => {
                include_str!("../../queries/new_years_programmes.rq")
            }
            NamedQuery::DanubeTracks => include_str!("../../queries/danube_tracks.rq"),
        }
    }

    /// Projected variables, in SELECT order.
    pub fn projected_variables(self) -> &'static [&'static str] {
        match self {
            NamedQuery::NewYearsReleases => &["release", "year", "track", "trackNum", "title"],
            NamedQuery::NewYearsProgrammes => {
                &["concert", "year", "conductor", "programmeItemNumber", "programmeItemTitle"]
            }
            NamedQuery::DanubeTracks => &["title", "isNewYearsConcert"],
        }
    }

    /// `ORDER BY` keys. Empty means row order is endpoint-defined.
    pub fn ordering(self) -> &'static [&'static str] {
        match self {
            NamedQuery::NewYearsReleases => &["release", "trackNum"],
            NamedQuery::NewYearsProgrammes => &[],
            NamedQuery::DanubeTracks => &["track"],
        }
    }

    pub fn is_ordered(self) -> bool {
        !self.ordering().is_empty()
    }
}

impl fmt::Display for NamedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedQuery {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "new-years-releases" | "releases" | "a" => Ok(NamedQuery::NewYearsReleases),
            "new-years-programmes" | "programmes" | "b" => Ok(NamedQuery::NewYearsProgrammes),
            "danube-tracks" | "danube" | "c" => Ok(NamedQuery::DanubeTracks),
            other => Err(RunnerError::Config(format!("unknown query '{}'", other))),
        }
    }
}

/// Prefix `text` with a `BASE` declaration when a base IRI is given.
pub fn with_base(text: &str, base_iri: Option<&str>) -> String {
    match base_iri {
        Some(base) => format!("BASE <{}>\n{}", base, text),
        None => text.to_string(),
    }
}

/// Source of query texts: the embedded files, or a directory overriding them.
#[derive(Debug, Clone, Default)]
pub struct QueryCatalog {
    directory: Option<PathBuf>,
    base_iri: Option<String>,
}

impl QueryCatalog {
    pub fn embedded() -> Self {
        Self::default()
    }

    pub fn from_directory(directory: impl Into<PathBuf>) -> Self {
        Self { directory: Some(directory.into()), base_iri: None }
    }

    pub fn with_base_iri(mut self, base_iri: Option<String>) -> Self {
        self.base_iri = base_iri;
        self
    }

    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_deref()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Query text as it will be sent, including any `BASE` prologue.
    ///
    /// Files missing from an override directory fall back to the embedded text.
    pub fn text(&self, query: NamedQuery) -> Result<String> {
        let raw = match &self.directory {
            Some(dir) => {
                let path = dir.join(query.file_name());
                if path.is_file() {
                    tracing::debug!(query = %query, path = %path.display(), "loading query from disk");
                    std::fs::read_to_string(&path)?
                } else {
                    query.text().to_string()
                }
            }
            None => query.text().to_string(),
        };

        if raw.trim().is_empty() {
            return Err(RunnerError::Config(format!("query file for {} is empty", query)));
        }

        Ok(with_base(&raw, self.base_iri.as_deref()))
    }
}
