//! Cue sheet parsing for ripped concert CDs.
//!
//! Only the fields needed to line a disc up against the recording archive are
//! kept: header metadata, and per track its title, performer, ISRC, pregap and
//! the `INDEX 01` start position. Everything else is skipped.

use crate::error::{Result, RunnerError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueTrack {
    pub number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pregap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueSheet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// `REM` entries keyed by lower-cased name, plus `catalog`, `title` and
    /// `performer` when present.
    pub header: BTreeMap<String, String>,
    pub tracks: Vec<CueTrack>,
}

impl CueSheet {
    pub fn track(&self, number: u32) -> Option<&CueTrack> {
        self.tracks.iter().find(|t| t.number == number)
    }
}

/// Where the parser is in the sheet: header lines, an audio track's
/// lines, or lines of a data track that are not recorded.
#[derive(Debug, Clone, Copy)]
enum Position {
    Header,
    Track(usize),
    DataTrack,
}

pub struct CueParser {
    rem_regex: Regex,
    header_field_regex: Regex,
    track_regex: Regex,
    track_field_regex: Regex,
    index_regex: Regex,
}

impl CueParser {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| RunnerError::Cue(format!("bad pattern: {}", e)))
        };

        Ok(CueParser {
            rem_regex: compile(r"^REM\s+(\S+)\s+(.*)$")?,
            header_field_regex: compile(r"^(CATALOG|TITLE|PERFORMER)\s+(.*)$")?,
            track_regex: compile(r"^TRACK\s+(\d+)\s+(\S+)")?,
            track_field_regex: compile(r"^(TITLE|PERFORMER|ISRC|PREGAP)\s+(.*)$")?,
            index_regex: compile(r"^INDEX\s+01\s+(\S+)")?,
        })
    }

    pub fn parse_str(&self, content: &str) -> Result<CueSheet> {
        let mut sheet = CueSheet::default();
        let mut position = Position::Header;

        for (line_no, raw) in content.lines().enumerate() {
            let line = raw.trim().trim_start_matches('\u{feff}');
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = self.track_regex.captures(line) {
                let number: u32 = caps[1].parse().map_err(|_| {
                    RunnerError::Cue(format!("line {}: bad track number {}", line_no + 1, &caps[1]))
                })?;
                if !caps[2].eq_ignore_ascii_case("AUDIO") {
                    tracing::debug!(line = line_no + 1, number, kind = &caps[2], "skipping data track");
                    position = Position::DataTrack;
                    continue;
                }
                position = Position::Track(match sheet.tracks.iter().position(|t| t.number == number) {
                    Some(existing) => existing,
                    None => {
                        sheet.tracks.push(CueTrack { number, ..CueTrack::default() });
                        sheet.tracks.len() - 1
                    }
                });
                continue;
            }

            match position {
                Position::DataTrack => {}
                Position::Header => {
                    if let Some(caps) = self.rem_regex.captures(line) {
                        sheet.header.insert(caps[1].to_lowercase(), unquote(&caps[2]));
                    } else if let Some(caps) = self.header_field_regex.captures(line) {
                        sheet.header.insert(caps[1].to_lowercase(), unquote(&caps[2]));
                    } else {
                        tracing::debug!(line = line_no + 1, content = line, "skipping header line");
                    }
                }
                Position::Track(idx) => {
                    let track = &mut sheet.tracks[idx];
                    if let Some(caps) = self.track_field_regex.captures(line) {
                        let value = Some(unquote(&caps[2]));
                        match &caps[1] {
                            "TITLE" => track.title = value,
                            "PERFORMER" => track.performer = value,
                            "ISRC" => track.isrc = value,
                            _ => track.pregap = value,
                        }
                    } else if let Some(caps) = self.index_regex.captures(line) {
                        track.index = Some(caps[1].to_string());
                    } else {
                        tracing::debug!(line = line_no + 1, content = line, "skipping track line");
                    }
                }
            }
        }

        Ok(sheet)
    }

    /// Parse a file. Bytes that are not UTF-8 (many rippers write Latin-1)
    /// are replaced rather than rejected.
    pub fn parse_file(&self, path: &Path) -> Result<CueSheet> {
        let bytes = std::fs::read(path)
            .map_err(|e| RunnerError::Cue(format!("{}: {}", path.display(), e)))?;
        let mut sheet = self.parse_str(&String::from_utf8_lossy(&bytes))?;
        sheet.source = Some(path.to_path_buf());
        Ok(sheet)
    }
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

fn is_cue(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("cue"))
}

/// Resolve `path` to the cue files to parse, sorted by path.
pub fn discover_cue_files(path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !recursive {
        if !is_cue(path) {
            return Err(RunnerError::Cue(format!(
                "{} is not a cue file; use --recursive to search a directory",
                path.display()
            )));
        }
        if !path.exists() {
            return Err(RunnerError::Cue(format!("could not find {}", path.display())));
        }
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.exists() {
        return Err(RunnerError::Cue(format!("could not find {}", path.display())));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_cue(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    tracing::debug!(count = files.len(), root = %path.display(), "discovered cue files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"REM GENRE Classical
REM DATE 1987
CATALOG 0028941920125
PERFORMER "Wiener Philharmoniker"
TITLE "Neujahrskonzert 1987"
FILE "disc.flac" WAVE
  TRACK 01 AUDIO
    TITLE "Ohne Sorgen"
    PERFORMER "Herbert von Karajan"
    ISRC ATA018700101
    INDEX 00 00:00:00
    INDEX 01 00:00:32
  TRACK 02 AUDIO
    TITLE "An der schönen blauen Donau"
    PREGAP 00:02:00
    INDEX 01 02:41:10
"#;

    #[test]
    fn test_parse_header() {
        let sheet = CueParser::new().unwrap().parse_str(SHEET).unwrap();
        assert_eq!(sheet.header.get("genre").map(String::as_str), Some("Classical"));
        assert_eq!(sheet.header.get("date").map(String::as_str), Some("1987"));
        assert_eq!(sheet.header.get("catalog").map(String::as_str), Some("0028941920125"));
        assert_eq!(
            sheet.header.get("performer").map(String::as_str),
            Some("Wiener Philharmoniker")
        );
        assert_eq!(sheet.header.get("title").map(String::as_str), Some("Neujahrskonzert 1987"));
        assert!(!sheet.header.contains_key("file"));
    }

    #[test]
    fn test_parse_tracks() {
        let sheet = CueParser::new().unwrap().parse_str(SHEET).unwrap();
        assert_eq!(sheet.tracks.len(), 2);

        let first = sheet.track(1).unwrap();
        assert_eq!(first.title.as_deref(), Some("Ohne Sorgen"));
        assert_eq!(first.performer.as_deref(), Some("Herbert von Karajan"));
        assert_eq!(first.isrc.as_deref(), Some("ATA018700101"));
        assert_eq!(first.index.as_deref(), Some("00:00:32"));
        assert!(first.pregap.is_none());

        let second = sheet.track(2).unwrap();
        assert_eq!(second.title.as_deref(), Some("An der schönen blauen Donau"));
        assert_eq!(second.pregap.as_deref(), Some("00:02:00"));
        assert_eq!(second.index.as_deref(), Some("02:41:10"));
    }

    #[test]
    fn test_repeated_track_number_updates_same_entry() {
        let sheet = CueParser::new()
            .unwrap()
            .parse_str("TRACK 3 AUDIO\nTITLE A\nTRACK 3 AUDIO\nISRC X\n")
            .unwrap();
        assert_eq!(sheet.tracks.len(), 1);
        assert_eq!(sheet.tracks[0].title.as_deref(), Some("A"));
        assert_eq!(sheet.tracks[0].isrc.as_deref(), Some("X"));
    }

    #[test]
    fn test_data_track_fields_are_skipped() {
        let sheet = CueParser::new()
            .unwrap()
            .parse_str(
                "TRACK 02 AUDIO\nTITLE \"Radetzky-Marsch\"\nINDEX 01 10:00:00\n\
                 TRACK 03 MODE1/2352\nTITLE \"Bonus video\"\nINDEX 01 14:02:00\n",
            )
            .unwrap();
        assert_eq!(sheet.tracks.len(), 1);
        assert_eq!(sheet.tracks[0].title.as_deref(), Some("Radetzky-Marsch"));
        assert_eq!(sheet.tracks[0].index.as_deref(), Some("10:00:00"));
        assert!(sheet.track(3).is_none());
        assert!(!sheet.header.contains_key("title"));
    }

    #[test]
    fn test_non_cue_path_requires_recursive() {
        let err = discover_cue_files(Path::new("notes.txt"), false).unwrap_err();
        assert!(err.to_string().contains("--recursive"));
    }

    #[test]
    fn test_missing_cue_file() {
        let err = discover_cue_files(Path::new("/nonexistent/disc.cue"), false).unwrap_err();
        assert!(err.to_string().contains("could not find"));
    }
}
