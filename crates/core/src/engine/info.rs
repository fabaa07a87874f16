//! Parsing of streamed `info` lines
//!
//! The engine reports progressively deeper results for each candidate line.
//! `PvTable` keeps the latest report per rank; older, shallower reports for
//! the same rank are overwritten.

use std::collections::BTreeMap;

use tracing::trace;

use super::analysis::{EvaluationLine, Score};

/// Parses one `info` line into an evaluation line.
///
/// Returns `None` for lines without a score or principal variation
/// (currmove updates, `info string`, ...) and for malformed lines.
pub fn parse_info_line(line: &str) -> Option<EvaluationLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first() != Some(&"info") {
        return None;
    }

    let mut depth: Option<u32> = None;
    let mut rank: Option<u32> = None;
    let mut score = None;
    let mut pv = Vec::new();
    let mut i = 1;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                depth = Some(tokens.get(i)?.parse().ok()?);
            }
            "multipv" => {
                i += 1;
                rank = Some(tokens.get(i)?.parse().ok()?);
            }
            "score" => {
                let kind = *tokens.get(i + 1)?;
                let value: i32 = tokens.get(i + 2)?.parse().ok()?;
                score = match kind {
                    "cp" => Some(Score::Centipawns(value)),
                    "mate" => Some(Score::Mate(value)),
                    _ => return None,
                };
                i += 2;
            }
            "pv" => {
                i += 1;
                while i < tokens.len() && !is_keyword(tokens[i]) {
                    pv.push(tokens[i].to_string());
                    i += 1;
                }
                continue;
            }
            // Free text until end of line
            "string" => return None,
            _ => {}
        }
        i += 1;
    }

    if pv.is_empty() {
        return None;
    }

    Some(EvaluationLine {
        rank: rank.unwrap_or(1),
        depth: depth.unwrap_or(0),
        score: score?,
        pv,
    })
}

fn is_keyword(token: &str) -> bool {
    matches!(
        token,
        "depth"
            | "seldepth"
            | "time"
            | "nodes"
            | "score"
            | "pv"
            | "multipv"
            | "currmove"
            | "currmovenumber"
            | "hashfull"
            | "nps"
            | "tbhits"
            | "cpuload"
            | "string"
            | "refutation"
            | "currline"
    )
}

/// Latest evaluation line per rank.
#[derive(Debug, Default)]
pub struct PvTable {
    lines: BTreeMap<u32, EvaluationLine>,
}

impl PvTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw engine line. Returns true if it updated the table.
    pub fn observe(&mut self, raw: &str) -> bool {
        match parse_info_line(raw) {
            Some(line) => {
                self.lines.insert(line.rank, line);
                true
            }
            None => {
                trace!("Skipping engine line: {}", raw);
                false
            }
        }
    }

    pub fn get(&self, rank: u32) -> Option<&EvaluationLine> {
        self.lines.get(&rank)
    }

    /// The rank 1 line, if the engine reported one.
    pub fn best(&self) -> Option<&EvaluationLine> {
        self.get(1)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Ranks `1..=count` in order, skipping ranks the engine never reported.
    pub fn into_lines(self, count: u32) -> Vec<EvaluationLine> {
        self.lines
            .into_values()
            .filter(|line| (1..=count).contains(&line.rank))
            .collect()
    }
}
