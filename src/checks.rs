//! Row-level verification of what each archive query promises about its
//! output. Used by `run --verify` and by the fixture tests.

use crate::queries::NamedQuery;
use crate::results::{ResultSet, Row};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub query: &'static str,
    pub row: usize,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} row {}: {}", self.query, self.row, self.message)
    }
}

/// Check every row of `results` against the guarantees of `query`.
pub fn verify(query: NamedQuery, results: &ResultSet) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut report = |row: usize, message: String| {
        violations.push(Violation { query: query.name(), row, message });
    };

    for (index, row) in results.iter().enumerate() {
        let problems = match query {
            NamedQuery::NewYearsReleases => check_release_row(row),
            NamedQuery::NewYearsProgrammes => check_programme_row(row),
            NamedQuery::DanubeTracks => check_danube_row(row),
        };
        for problem in problems {
            report(index, problem);
        }
    }

    if query == NamedQuery::NewYearsReleases {
        for (index, pair) in results.rows.windows(2).enumerate() {
            if compare_release_order(&pair[0], &pair[1]) == Ordering::Greater {
                report(index + 1, "rows are not ordered by ?release, ?trackNum".to_string());
            }
        }
    }

    tracing::debug!(query = query.name(), violations = violations.len(), "verified rows");
    violations
}

/// Four trailing ASCII digits of `value`, if it ends in them.
pub fn trailing_year(value: &str) -> Option<&str> {
    if value.len() < 4 || !value.is_char_boundary(value.len() - 4) {
        return None;
    }
    let tail = &value[value.len() - 4..];
    if tail.bytes().all(|b| b.is_ascii_digit()) {
        Some(tail)
    } else {
        None
    }
}

fn is_year(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}

fn check_release_row(row: &Row) -> Vec<String> {
    let mut problems = Vec::new();
    let Some(release) = row.lexical("release") else {
        return vec!["?release is unbound".to_string()];
    };

    if !release.contains("Neujahrskonzerte") {
        problems.push(format!("release {} does not contain Neujahrskonzerte", release));
    }

    match (trailing_year(release), row.lexical("year")) {
        (None, _) => problems.push(format!("release {} does not end in four digits", release)),
        (Some(expected), Some(year)) if expected != year => {
            problems.push(format!("?year {} differs from release suffix {}", year, expected))
        }
        (Some(_), None) => problems.push("?year is unbound".to_string()),
        _ => {}
    }

    problems
}

fn check_programme_row(row: &Row) -> Vec<String> {
    match row.lexical("year") {
        Some(year) if is_year(year) => Vec::new(),
        Some(year) => vec![format!("?year {} is not four digits", year)],
        None => vec!["?year is unbound".to_string()],
    }
}

fn check_danube_row(row: &Row) -> Vec<String> {
    let mut problems = Vec::new();
    match row.lexical("title") {
        Some(title) => {
            if !title.contains("onau") {
                problems.push(format!("title {:?} does not contain 'onau'", title));
            }
            if title.contains("eibchen") {
                problems.push(format!("title {:?} contains 'eibchen'", title));
            }
        }
        None => problems.push("?title is unbound".to_string()),
    }

    if row.get("isNewYearsConcert").and_then(|t| t.as_bool()).is_none() {
        problems.push("?isNewYearsConcert is not an xsd:boolean".to_string());
    }
    problems
}

fn compare_release_order(a: &Row, b: &Row) -> Ordering {
    let release = a.lexical("release").cmp(&b.lexical("release"));
    if release != Ordering::Equal {
        return release;
    }

    let na = a.get("trackNum").and_then(|t| t.as_integer());
    let nb = b.get("trackNum").and_then(|t| t.as_integer());
    match (na, nb) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.lexical("trackNum").cmp(&b.lexical("trackNum")),
    }
}
