//! Parsers for archive source material.

pub mod cue_parser;
