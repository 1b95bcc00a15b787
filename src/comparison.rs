//! Year-by-year cross-reference of the recording archive against the concert
//! programme archive.
//!
//! Inputs are the rows of the releases query and the programmes query. Titles
//! are matched after trimming and case folding; anything finer (alternative
//! spellings, opus numbers) is left to the reader of the report.

use crate::results::ResultSet;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Titles of one year that only one of the two archives knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearDifference {
    pub recorded_only: BTreeSet<String>,
    pub programmed_only: BTreeSet<String>,
}

impl YearDifference {
    pub fn is_empty(&self) -> bool {
        self.recorded_only.is_empty() && self.programmed_only.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearComparison {
    pub in_both: BTreeSet<String>,
    pub recordings_only: BTreeSet<String>,
    pub programmes_only: BTreeSet<String>,
    /// Only years present in both archives with at least one differing title.
    pub differences: BTreeMap<String, YearDifference>,
}

fn normalise(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// year -> (normalised title -> first spelling seen)
fn titles_by_year(results: &ResultSet, title_var: &str) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut by_year: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for row in results {
        let Some(year) = row.lexical("year").filter(|year| !year.is_empty()) else {
            continue;
        };
        let titles = by_year.entry(year.to_string()).or_default();
        if let Some(title) = row.lexical(title_var) {
            titles.entry(normalise(title)).or_insert_with(|| title.trim().to_string());
        }
    }
    by_year
}

/// Compare the releases query rows with the programmes query rows.
pub fn compare(recordings: &ResultSet, programmes: &ResultSet) -> YearComparison {
    let recorded = titles_by_year(recordings, "title");
    let programmed = titles_by_year(programmes, "programmeItemTitle");

    let mut comparison = YearComparison::default();

    for (year, recorded_titles) in &recorded {
        let Some(programmed_titles) = programmed.get(year) else {
            comparison.recordings_only.insert(year.clone());
            continue;
        };
        comparison.in_both.insert(year.clone());

        let difference = YearDifference {
            recorded_only: recorded_titles
                .iter()
                .filter(|(key, _)| !programmed_titles.contains_key(*key))
                .map(|(_, title)| title.clone())
                .collect(),
            programmed_only: programmed_titles
                .iter()
                .filter(|(key, _)| !recorded_titles.contains_key(*key))
                .map(|(_, title)| title.clone())
                .collect(),
        };
        if !difference.is_empty() {
            comparison.differences.insert(year.clone(), difference);
        }
    }

    for year in programmed.keys() {
        if !recorded.contains_key(year) {
            comparison.programmes_only.insert(year.clone());
        }
    }

    tracing::info!(
        in_both = comparison.in_both.len(),
        recordings_only = comparison.recordings_only.len(),
        programmes_only = comparison.programmes_only.len(),
        "compared recording and programme archives"
    );
    comparison
}

impl fmt::Display for YearComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(", ");

        writeln!(f, "Years in both archives: {}", join(&self.in_both))?;
        writeln!(f, "Recorded but not in programme archive: {}", join(&self.recordings_only))?;
        writeln!(f, "Programmed but not recorded: {}", join(&self.programmes_only))?;

        for (year, difference) in &self.differences {
            writeln!(f)?;
            writeln!(f, "{}", year)?;
            for title in &difference.recorded_only {
                writeln!(f, "  + recorded only:   {}", title)?;
            }
            for title in &difference.programmed_only {
                writeln!(f, "  - programmed only: {}", title)?;
            }
        }
        Ok(())
    }
}
