//! The two entry points used by the HTTP layer
//!
//! Inputs are validated here, before any engine process is spawned.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::engine::{format_lines, Evaluator, StockfishEvaluator};
use crate::error::{Error, Result};
use crate::notation::{parse_position, render_position};
use crate::sweep::{GameSweeper, SweepReport};

/// Upper bound accepted by Stockfish's MultiPV option.
pub const MAX_MULTIPV: u32 = 500;

/// Formatted evaluation of a single position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionReport {
    pub fen: String,
    pub depth: u8,
    pub multipv: u32,
    /// Text diagram of the position
    pub board: String,
    /// One `(<score>) <numbered line>` per rank
    pub engine_lines: String,
}

pub struct Analyzer<E: Evaluator = StockfishEvaluator> {
    evaluator: E,
}

impl Analyzer<StockfishEvaluator> {
    pub fn with_engine(config: EngineConfig) -> Self {
        Self::new(StockfishEvaluator::new(config))
    }
}

impl<E: Evaluator> Analyzer<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Evaluates `fen` and renders the top `multipv` lines.
    pub fn analyze_position(&self, fen: &str, depth: u8, multipv: u32) -> Result<PositionReport> {
        check_depth(depth)?;
        if multipv == 0 || multipv > MAX_MULTIPV {
            return Err(Error::InvalidRequest(format!(
                "multipv must be between 1 and {}",
                MAX_MULTIPV
            )));
        }
        let position = parse_position(fen)?;

        info!("Analyzing {} at depth {} with {} lines", fen, depth, multipv);
        let lines = self.evaluator.evaluate_top_lines(&position, depth, multipv)?;

        Ok(PositionReport {
            fen: fen.trim().to_string(),
            depth,
            multipv,
            board: render_position(&position),
            engine_lines: format_lines(&lines, &position),
        })
    }

    /// Sweeps a PGN for mistakes and blunders.
    pub fn analyze_sweep(&self, pgn: &str, depth: u8) -> Result<SweepReport> {
        check_depth(depth)?;
        GameSweeper::new(&self.evaluator).sweep(pgn, depth)
    }
}

fn check_depth(depth: u8) -> Result<()> {
    if depth == 0 {
        return Err(Error::InvalidRequest("depth must be at least 1".into()));
    }
    Ok(())
}
