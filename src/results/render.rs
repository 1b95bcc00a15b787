//! Human and tool friendly renderings of a [`ResultSet`].

use super::{json, ResultSet};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

pub fn render(results: &ResultSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(to_table(results)),
        OutputFormat::Tsv => Ok(to_tsv(results)),
        OutputFormat::Json => json::to_string(results),
    }
}

/// SPARQL 1.1 TSV: `?var` header, terms in N-Triples syntax, empty cell for
/// unbound.
pub fn to_tsv(results: &ResultSet) -> String {
    let mut out = String::new();
    let header: Vec<String> = results.variables.iter().map(|v| format!("?{}", v)).collect();
    out.push_str(&header.join("\t"));
    out.push('\n');

    for row in results {
        let cells: Vec<String> = results
            .variables
            .iter()
            .map(|v| row.get(v).map(|t| t.to_string()).unwrap_or_default())
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

/// Column-aligned text table of lexical values.
pub fn to_table(results: &ResultSet) -> String {
    let cells: Vec<Vec<&str>> = results
        .rows
        .iter()
        .map(|row| results.variables.iter().map(|v| row.lexical(v).unwrap_or("")).collect())
        .collect();

    let widths: Vec<usize> = results
        .variables
        .iter()
        .enumerate()
        .map(|(i, v)| {
            cells.iter().map(|r| r[i].chars().count()).max().unwrap_or(0).max(v.chars().count())
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = results
        .variables
        .iter()
        .zip(&widths)
        .map(|(v, w)| format!("{:<width$}", v, width = *w))
        .collect();
    out.push_str(header.join(" | ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect();
        out.push_str(line.join(" | ").trim_end());
        out.push('\n');
    }

    out.push_str(&format!("({} rows)\n", results.len()));
    out
}
